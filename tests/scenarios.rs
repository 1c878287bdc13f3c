//! The six concrete end-to-end scenarios a correct evaluation pipeline
//! must reproduce exactly: closures, resolver shadowing discipline, late
//! method binding, superclass dispatch, initializer return value, and
//! for-loop desugaring.

mod common;
use common::run;

#[test]
fn closure_counter() {
    let source = "
        fun makeCounter() {
            var i = 0;
            fun count() {
                i = i + 1;
                print i;
            }
            return count;
        }
        var c = makeCounter();
        c();
        c();
    ";
    assert_eq!(run(source), "1\n2\n");
}

#[test]
fn resolver_discipline_shadowing_after_capture() {
    let source = r#"
        var a = "global";
        {
            fun show() { print a; }
            show();
            var a = "block";
            show();
        }
    "#;
    assert_eq!(run(source), "global\nglobal\n");
}

#[test]
fn this_rebinds_when_method_extracted() {
    let source = r#"
        class Egotist {
            speak() { print this; }
        }
        var method = Egotist().speak;
        method();
    "#;
    assert_eq!(run(source), "Egotist instance\n");
}

#[test]
fn super_dispatches_to_parent_method() {
    let source = r#"
        class A {
            greet() { print "A"; }
        }
        class B < A {
            greet() {
                super.greet();
                print "B";
            }
        }
        B().greet();
    "#;
    assert_eq!(run(source), "A\nB\n");
}

#[test]
fn init_always_returns_this_even_with_bare_return() {
    let source = "
        class Foo {
            init() { return; }
        }
        print Foo();
    ";
    assert_eq!(run(source), "Foo instance\n");
}

#[test]
fn for_loop_desugars_to_while() {
    let source = "for (var i = 0; i < 3; i = i + 1) print i;";
    assert_eq!(run(source), "0\n1\n2\n");
}
