mod common;
use common::run;

#[test]
fn fields_are_set_and_read_through_instances() {
    let source = r#"
        class Bagel {}
        var bagel = Bagel();
        bagel.flavor = "plain";
        print bagel.flavor;
    "#;
    assert_eq!(run(source), "plain\n");
}

#[test]
fn methods_see_fields_through_this() {
    let source = r#"
        class Box {
            init(contents) { this.contents = contents; }
            show() { print this.contents; }
        }
        Box("socks").show();
    "#;
    assert_eq!(run(source), "socks\n");
}

#[test]
fn init_with_arguments_sets_arity_to_init_arity() {
    let source = "
        class Point {
            init(x, y) {
                this.x = x;
                this.y = y;
            }
            sum() { return this.x + this.y; }
        }
        print Point(3, 4).sum();
    ";
    assert_eq!(run(source), "7\n");
}

#[test]
fn inherited_methods_are_visible_on_subclass_instances() {
    let source = r#"
        class Doughnut {
            cook() { print "Fry until golden brown."; }
        }
        class BostonCream < Doughnut {}
        BostonCream().cook();
    "#;
    assert_eq!(run(source), "Fry until golden brown.\n");
}

#[test]
fn overridden_method_takes_precedence_over_superclass() {
    let source = r#"
        class Doughnut {
            cook() { print "Fry."; }
        }
        class BostonCream < Doughnut {
            cook() { print "Fry, then fill."; }
        }
        BostonCream().cook();
    "#;
    assert_eq!(run(source), "Fry, then fill.\n");
}

#[test]
fn super_walks_past_an_intervening_override() {
    let source = r#"
        class A { greet() { print "A"; } }
        class B < A { greet() { print "B"; } }
        class C < B {
            greet() {
                super.greet();
            }
        }
        C().greet();
    "#;
    assert_eq!(run(source), "B\n");
}

#[test]
fn find_method_prefers_the_nearest_ancestor() {
    let source = r#"
        class A { hello() { print "A hello"; } }
        class B < A { hello() { print "B hello"; } }
        class C < B {}
        C().hello();
    "#;
    assert_eq!(run(source), "B hello\n");
}

#[test]
fn class_prints_its_own_name() {
    let source = "class Pretzel {} print Pretzel;";
    assert_eq!(run(source), "Pretzel\n");
}

#[test]
fn instance_prints_class_name_and_instance_suffix() {
    let source = "class Pretzel {} print Pretzel();";
    assert_eq!(run(source), "Pretzel instance\n");
}
