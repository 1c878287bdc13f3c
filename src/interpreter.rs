use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::class::LoxClass;
use crate::environment::Environment;
use crate::error::{EvalResult, ExecResult, RuntimeError, Unwind};
use crate::expr::{self, Expr, ExprVisitor, Literal};
use crate::function::{Function, NativeFunction};
use crate::object::{Callable, Object};
use crate::stmt::{self, Stmt, StmtVisitor};
use crate::token::TokenKind;

/// Walks the AST directly against the resolver's side-table, evaluating
/// expressions and executing statements. Output goes through a generic
/// writer so tests can capture it instead of inheriting the real stdout.
pub struct Interpreter<'out> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<expr::NodeId, usize>,
    out: &'out mut dyn Write,
}

impl<'out> Interpreter<'out> {
    pub fn new(out: &'out mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new(None)));
        for native in NativeFunction::globals() {
            globals.borrow_mut().define(native.name, Object::NativeFunction(Rc::new(native)));
        }

        Interpreter {
            globals: Rc::clone(&globals),
            environment: globals,
            locals: HashMap::new(),
            out,
        }
    }

    pub fn load_resolution(&mut self, locals: HashMap<expr::NodeId, usize>) {
        self.locals = locals;
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            if let Err(unwind) = self.execute(statement) {
                return Err(match unwind {
                    Unwind::Error(error) => error,
                    Unwind::Return(_) => unreachable!("top-level code cannot return"),
                });
            }
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> ExecResult {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(());
        for statement in statements {
            if let Err(unwind) = self.execute(statement) {
                result = Err(unwind);
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    fn lookup_variable(&self, id: expr::NodeId, name: &crate::token::Token) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => self.environment.borrow().get_at(distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}

impl ExprVisitor<EvalResult> for Interpreter<'_> {
    fn visit_literal_expr(&mut self, value: &Literal) -> EvalResult {
        Ok(match value {
            Literal::Number(n) => Object::Number(*n),
            Literal::String(s) => Object::String(s.clone()),
            Literal::Bool(b) => Object::Bool(*b),
            Literal::Nil => Object::Nil,
        })
    }

    fn visit_unary_expr(&mut self, data: &expr::UnaryData) -> EvalResult {
        let right = self.evaluate(&data.right)?;

        match data.operator.kind {
            TokenKind::Minus => (-right)
                .ok_or_else(|| RuntimeError {
                    token: data.operator.clone(),
                    message: "Operand must be a number.".to_string(),
                })
                .map_err(Unwind::from),
            TokenKind::Bang => Ok(!right),
            _ => unreachable!("unary operator is always `-` or `!`"),
        }
    }

    fn visit_binary_expr(&mut self, data: &expr::BinaryData) -> EvalResult {
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;
        let operator = &data.operator;

        let numeric_error = || RuntimeError {
            token: operator.clone(),
            message: "Operands must be numbers.".to_string(),
        };
        let as_numbers = |l: &Object, r: &Object| match (l, r) {
            (Object::Number(a), Object::Number(b)) => Ok((*a, *b)),
            _ => Err(numeric_error()),
        };

        let result = match operator.kind {
            TokenKind::Greater => as_numbers(&left, &right).map(|(a, b)| Object::Bool(a > b)),
            TokenKind::GreaterEqual => as_numbers(&left, &right).map(|(a, b)| Object::Bool(a >= b)),
            TokenKind::Less => as_numbers(&left, &right).map(|(a, b)| Object::Bool(a < b)),
            TokenKind::LessEqual => as_numbers(&left, &right).map(|(a, b)| Object::Bool(a <= b)),
            TokenKind::EqualEqual => Ok(Object::Bool(left == right)),
            TokenKind::BangEqual => Ok(Object::Bool(left != right)),
            TokenKind::Minus => (left - right).ok_or_else(numeric_error),
            TokenKind::Slash => as_numbers(&left, &right).and_then(|(a, b)| {
                if b == 0.0 {
                    Err(RuntimeError {
                        token: operator.clone(),
                        message: "Division by zero.".to_string(),
                    })
                } else {
                    Ok(Object::Number(a / b))
                }
            }),
            TokenKind::Star => (left * right).ok_or_else(numeric_error),
            TokenKind::Plus => (left + right).ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be two numbers or two strings.".to_string(),
            }),
            _ => unreachable!("binary operator is one of the arithmetic/comparison tokens"),
        };

        result.map_err(Unwind::from)
    }

    fn visit_grouping_expr(&mut self, data: &expr::GroupingData) -> EvalResult {
        self.evaluate(&data.expr)
    }

    fn visit_variable_expr(&mut self, data: &expr::VariableData) -> EvalResult {
        self.lookup_variable(data.id, &data.name).map_err(Unwind::from)
    }

    fn visit_assign_expr(&mut self, data: &expr::AssignData) -> EvalResult {
        let value = self.evaluate(&data.value)?;

        match self.locals.get(&data.id) {
            Some(&distance) => {
                self.environment.borrow_mut().assign_at(distance, &data.name, value.clone());
            }
            None => {
                self.globals.borrow_mut().assign(&data.name, value.clone())?;
            }
        }

        Ok(value)
    }

    fn visit_logical_expr(&mut self, data: &expr::LogicalData) -> EvalResult {
        let left = self.evaluate(&data.left)?;

        // `or`/`and` short-circuit to the unevaluated operand itself, not
        // a coerced boolean — `"a" or 1` yields `"a"`.
        if data.operator.kind == TokenKind::Or {
            if left.is_truthy() {
                return Ok(left);
            }
        } else if !left.is_truthy() {
            return Ok(left);
        }

        self.evaluate(&data.right)
    }

    fn visit_call_expr(&mut self, data: &expr::CallData) -> EvalResult {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let arity = match &callee {
            Object::Function(function) => function.arity(),
            Object::NativeFunction(function) => function.arity(),
            Object::Class(class) => class.borrow().arity(),
            _ => {
                return Err(Unwind::from(RuntimeError {
                    token: data.paren.clone(),
                    message: "Can only call functions and classes.".to_string(),
                }))
            }
        };

        if arguments.len() != arity {
            return Err(Unwind::from(RuntimeError {
                token: data.paren.clone(),
                message: format!("Expected {arity} arguments but got {}.", arguments.len()),
            }));
        }

        match &callee {
            Object::Function(function) => function.call(self, arguments).map_err(Unwind::from),
            Object::NativeFunction(function) => function.call(self, arguments).map_err(Unwind::from),
            Object::Class(class) => LoxClass::instantiate(class, self, arguments).map_err(Unwind::from),
            _ => unreachable!("checked above"),
        }
    }

    fn visit_get_expr(&mut self, data: &expr::GetData) -> EvalResult {
        let object = self.evaluate(&data.object)?;

        match object {
            Object::Instance(instance) => {
                crate::class::LoxInstance::get(&instance, &data.name).map_err(Unwind::from)
            }
            _ => Err(Unwind::from(RuntimeError {
                token: data.name.clone(),
                message: "Only instances have properties.".to_string(),
            })),
        }
    }

    fn visit_set_expr(&mut self, data: &expr::SetData) -> EvalResult {
        let object = self.evaluate(&data.object)?;

        let Object::Instance(instance) = object else {
            return Err(Unwind::from(RuntimeError {
                token: data.name.clone(),
                message: "Only instances have fields.".to_string(),
            }));
        };

        let value = self.evaluate(&data.value)?;
        instance.borrow_mut().set(&data.name, value.clone());
        Ok(value)
    }

    fn visit_this_expr(&mut self, data: &expr::ThisData) -> EvalResult {
        self.lookup_variable(data.id, &data.keyword).map_err(Unwind::from)
    }

    fn visit_super_expr(&mut self, data: &expr::SuperData) -> EvalResult {
        let distance = *self.locals.get(&data.id).expect("resolver always resolves `super`");
        let superclass = self.environment.borrow().get_at(distance, &data.keyword)?;
        let Object::Class(superclass) = superclass else {
            unreachable!("resolver only binds `super` to a class")
        };

        // `this` is always declared exactly one scope inside `super`'s.
        let this_token = crate::token::Token::new(TokenKind::This, "this", None, data.keyword.line);
        let instance = self.environment.borrow().get_at(distance - 1, &this_token)?;

        let method = superclass.borrow().find_method(&data.method.lexeme).ok_or_else(|| RuntimeError {
            token: data.method.clone(),
            message: format!("Undefined property '{}'.", data.method.lexeme),
        })?;

        Ok(Object::Function(Rc::new(method.bind(instance))))
    }
}

impl StmtVisitor<ExecResult> for Interpreter<'_> {
    fn visit_expression_stmt(&mut self, data: &stmt::ExpressionData) -> ExecResult {
        self.evaluate(&data.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, data: &stmt::PrintData) -> ExecResult {
        let value = self.evaluate(&data.expr)?;
        writeln!(self.out, "{value}").expect("write to output sink should not fail");
        Ok(())
    }

    fn visit_var_stmt(&mut self, data: &stmt::VarData) -> ExecResult {
        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::Nil,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, data: &stmt::BlockData) -> ExecResult {
        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&data.statements, Rc::new(RefCell::new(environment)))
    }

    fn visit_if_stmt(&mut self, data: &stmt::IfData) -> ExecResult {
        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, data: &stmt::WhileData) -> ExecResult {
        while self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.body)?;
        }
        Ok(())
    }

    fn visit_function_stmt(&mut self, data: &stmt::FunctionData) -> ExecResult {
        let function = Function::new(data, Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&data.name.lexeme, Object::Function(Rc::new(function)));
        Ok(())
    }

    fn visit_return_stmt(&mut self, data: &stmt::ReturnData) -> ExecResult {
        let value = match &data.value {
            Some(expr) => self.evaluate(expr)?,
            None => Object::Nil,
        };
        Err(Unwind::Return(value))
    }

    fn visit_class_stmt(&mut self, data: &stmt::ClassData) -> ExecResult {
        let superclass = match &data.superclass {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                let Object::Class(class) = value else {
                    let Expr::Variable(variable) = expr else {
                        unreachable!("resolver only allows a variable as a superclass expression")
                    };
                    return Err(Unwind::from(RuntimeError {
                        token: variable.name.clone(),
                        message: "Superclass must be a class.".to_string(),
                    }));
                };
                Some(class)
            }
            None => None,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, Object::Nil);

        let method_environment = if let Some(superclass) = &superclass {
            let environment = Environment::new(Some(Rc::clone(&self.environment)));
            let environment = Rc::new(RefCell::new(environment));
            environment.borrow_mut().define("super", Object::Class(Rc::clone(superclass)));
            environment
        } else {
            Rc::clone(&self.environment)
        };

        let mut methods = HashMap::new();
        for method in &data.methods {
            let Stmt::Function(function_data) = method else {
                unreachable!("class body only contains method declarations")
            };
            let is_initializer = function_data.name.lexeme == "init";
            let function = Function::new(function_data, Rc::clone(&method_environment), is_initializer);
            methods.insert(function_data.name.lexeme.clone(), Rc::new(function));
        }

        let class = LoxClass::new(data.name.lexeme.clone(), superclass, methods);
        self.environment.borrow_mut().assign(&data.name, Object::Class(Rc::new(RefCell::new(class))))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    fn run(source: &str) -> String {
        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        assert!(scan_errors.is_empty(), "unexpected scan errors: {scan_errors:?}");

        let (statements, parse_errors) = Parser::new(tokens).parse();
        assert!(parse_errors.is_empty(), "unexpected parse errors: {parse_errors:?}");

        let (locals, resolve_errors) = Resolver::new().resolve(&statements);
        assert!(resolve_errors.is_empty(), "unexpected resolve errors: {resolve_errors:?}");

        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        interpreter.load_resolution(locals);
        interpreter.interpret(&statements).expect("program should run without a runtime error");

        String::from_utf8(output).expect("interpreter output should be valid utf-8")
    }

    #[test]
    fn arithmetic_and_printing() {
        assert_eq!(run("print 1 + 2 * 3;"), "7\n");
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(run(r#"print "foo" + "bar";"#), "foobar\n");
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        let source = r#"
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    print i;
                }
                return count;
            }
            var counter = makeCounter();
            counter();
            counter();
        "#;
        assert_eq!(run(source), "1\n2\n");
    }

    #[test]
    fn or_and_and_return_the_operand_not_a_coerced_boolean() {
        assert_eq!(run(r#"print "hi" or 2;"#), "hi\n");
        assert_eq!(run("print nil and 1;"), "nil\n");
    }

    #[test]
    fn for_loop_desugars_correctly() {
        assert_eq!(run("for (var i = 0; i < 3; i = i + 1) print i;"), "0\n1\n2\n");
    }

    #[test]
    fn classes_support_fields_methods_and_init() {
        let source = r#"
            class Cake {
                init(flavor) {
                    this.flavor = flavor;
                }
                describe() {
                    print this.flavor + " cake";
                }
            }
            var cake = Cake("chocolate");
            cake.describe();
        "#;
        assert_eq!(run(source), "chocolate cake\n");
    }

    #[test]
    fn init_always_returns_this_even_with_a_bare_return() {
        let source = r#"
            class Thing {
                init() {
                    return;
                }
            }
            print Thing() == Thing();
        "#;
        assert_eq!(run(source), "false\n");
    }

    #[test]
    fn super_dispatches_to_the_parent_method() {
        let source = r#"
            class Doughnut {
                cook() {
                    print "Fry until golden brown.";
                }
            }
            class BostonCream < Doughnut {
                cook() {
                    super.cook();
                    print "Pipe full of custard and coat with chocolate.";
                }
            }
            BostonCream().cook();
        "#;
        assert_eq!(run(source), "Fry until golden brown.\nPipe full of custard and coat with chocolate.\n");
    }

    #[test]
    fn this_rebinds_correctly_when_a_method_is_extracted() {
        let source = r#"
            class Person {
                sayName() {
                    print this.name;
                }
            }
            var jane = Person();
            jane.name = "Jane";
            var method = jane.sayName;
            method();
        "#;
        assert_eq!(run(source), "Jane\n");
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let (tokens, _) = Scanner::new("print 1 / 0;").scan_tokens();
        let (statements, _) = Parser::new(tokens).parse();
        let (locals, _) = Resolver::new().resolve(&statements);
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        interpreter.load_resolution(locals);
        let error = interpreter.interpret(&statements).unwrap_err();
        assert!(error.message.contains("Division by zero"));
    }

    #[test]
    fn wrong_arity_is_a_runtime_error() {
        let (tokens, _) = Scanner::new("fun f(a) { return a; } f(1, 2);").scan_tokens();
        let (statements, _) = Parser::new(tokens).parse();
        let (locals, _) = Resolver::new().resolve(&statements);
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        interpreter.load_resolution(locals);
        let error = interpreter.interpret(&statements).unwrap_err();
        assert!(error.message.contains("Expected 1 arguments but got 2"));
    }
}
