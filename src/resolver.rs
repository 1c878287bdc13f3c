use std::collections::HashMap;
use std::mem;

use crate::error::ResolveError;
use crate::expr::*;
use crate::stmt::{self, Stmt, StmtVisitor};
use crate::token::Token;

#[derive(Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Computes, for every variable reference the parser tagged with a
/// [`NodeId`], how many enclosing scopes separate it from the scope that
/// declares it. The interpreter consults this side-table instead of
/// searching the environment chain at read/write time.
pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionType,
    current_class: ClassType,
    locals: HashMap<NodeId, usize>,
    errors: Vec<ResolveError>,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            locals: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn resolve(mut self, statements: &[Stmt]) -> (HashMap<NodeId, usize>, Vec<ResolveError>) {
        self.resolve_stmts(statements);
        (self.locals, self.errors)
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn resolve_function(&mut self, params: &[Token], body: &[Stmt], kind: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, kind);

        self.begin_scope();
        for param in params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };

        if scope.contains_key(&name.lexeme) {
            self.errors.push(ResolveError {
                token: name.clone(),
                message: "Already a variable with this name in this scope.".to_string(),
            });
        }
        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        scope.insert(name.lexeme.clone(), true);
    }

    fn resolve_local(&mut self, id: NodeId, name: &Token) {
        for (i, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.locals.insert(id, i);
                return;
            }
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprVisitor<()> for Resolver {
    fn visit_literal_expr(&mut self, _value: &Literal) {}

    fn visit_unary_expr(&mut self, data: &UnaryData) {
        self.resolve_expr(&data.right);
    }

    fn visit_binary_expr(&mut self, data: &BinaryData) {
        self.resolve_expr(&data.left);
        self.resolve_expr(&data.right);
    }

    fn visit_grouping_expr(&mut self, data: &GroupingData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_variable_expr(&mut self, data: &VariableData) {
        if let Some(scope) = self.scopes.last() {
            if scope.get(&data.name.lexeme) == Some(&false) {
                self.errors.push(ResolveError {
                    token: data.name.clone(),
                    message: "Can't read local variable in its own initializer.".to_string(),
                });
            }
        }

        self.resolve_local(data.id, &data.name);
    }

    fn visit_assign_expr(&mut self, data: &AssignData) {
        self.resolve_expr(&data.value);
        self.resolve_local(data.id, &data.name);
    }

    fn visit_logical_expr(&mut self, data: &LogicalData) {
        self.resolve_expr(&data.left);
        self.resolve_expr(&data.right);
    }

    fn visit_call_expr(&mut self, data: &CallData) {
        self.resolve_expr(&data.callee);
        for argument in &data.arguments {
            self.resolve_expr(argument);
        }
    }

    fn visit_get_expr(&mut self, data: &GetData) {
        self.resolve_expr(&data.object);
    }

    fn visit_set_expr(&mut self, data: &SetData) {
        self.resolve_expr(&data.value);
        self.resolve_expr(&data.object);
    }

    fn visit_this_expr(&mut self, data: &ThisData) {
        if self.current_class == ClassType::None {
            self.errors.push(ResolveError {
                token: data.keyword.clone(),
                message: "Can't use 'this' outside of a class.".to_string(),
            });
            return;
        }

        self.resolve_local(data.id, &data.keyword);
    }

    fn visit_super_expr(&mut self, data: &SuperData) {
        match self.current_class {
            ClassType::Subclass => {}
            ClassType::None => self.errors.push(ResolveError {
                token: data.keyword.clone(),
                message: "Can't use 'super' outside of a class.".to_string(),
            }),
            ClassType::Class => self.errors.push(ResolveError {
                token: data.keyword.clone(),
                message: "Can't use 'super' in a class with no superclass.".to_string(),
            }),
        }

        self.resolve_local(data.id, &data.keyword);
    }
}

impl StmtVisitor<()> for Resolver {
    fn visit_expression_stmt(&mut self, data: &stmt::ExpressionData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_print_stmt(&mut self, data: &stmt::PrintData) {
        self.resolve_expr(&data.expr);
    }

    fn visit_var_stmt(&mut self, data: &stmt::VarData) {
        self.declare(&data.name);
        if let Some(initializer) = &data.initializer {
            self.resolve_expr(initializer);
        }
        self.define(&data.name);
    }

    fn visit_block_stmt(&mut self, data: &stmt::BlockData) {
        self.begin_scope();
        self.resolve_stmts(&data.statements);
        self.end_scope();
    }

    fn visit_if_stmt(&mut self, data: &stmt::IfData) {
        self.resolve_expr(&data.condition);
        self.resolve_stmt(&data.then_branch);
        if let Some(else_branch) = &data.else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_while_stmt(&mut self, data: &stmt::WhileData) {
        self.resolve_expr(&data.condition);
        self.resolve_stmt(&data.body);
    }

    fn visit_function_stmt(&mut self, data: &stmt::FunctionData) {
        self.declare(&data.name);
        self.define(&data.name);
        self.resolve_function(&data.params, &data.body, FunctionType::Function);
    }

    fn visit_return_stmt(&mut self, data: &stmt::ReturnData) {
        if self.current_function == FunctionType::None {
            self.errors.push(ResolveError {
                token: data.keyword.clone(),
                message: "Can't return from top-level code.".to_string(),
            });
        }

        if let Some(value) = &data.value {
            if self.current_function == FunctionType::Initializer {
                self.errors.push(ResolveError {
                    token: data.keyword.clone(),
                    message: "Can't return a value from an initializer.".to_string(),
                });
                return;
            }

            self.resolve_expr(value);
        }
    }

    fn visit_class_stmt(&mut self, data: &stmt::ClassData) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(&data.name);
        self.define(&data.name);

        if let Some(superclass) = &data.superclass {
            if let Expr::Variable(variable) = superclass {
                if data.name.lexeme == variable.name.lexeme {
                    self.errors.push(ResolveError {
                        token: variable.name.clone(),
                        message: "A class can't inherit from itself.".to_string(),
                    });
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.scopes.last_mut().expect("scope just pushed").insert("super".to_string(), true);
        }

        self.begin_scope();
        self.scopes.last_mut().expect("scope just pushed").insert("this".to_string(), true);

        for method in &data.methods {
            let Stmt::Function(function) = method else {
                unreachable!("class body only contains method declarations")
            };
            let kind = if function.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(&function.params, &function.body, kind);
        }

        self.end_scope();

        if data.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn resolve(source: &str) -> (HashMap<NodeId, usize>, Vec<ResolveError>) {
        let (tokens, _) = Scanner::new(source).scan_tokens();
        let (statements, parse_errors) = Parser::new(tokens).parse();
        assert!(parse_errors.is_empty(), "unexpected parse errors: {parse_errors:?}");
        Resolver::new().resolve(&statements)
    }

    #[test]
    fn top_level_return_is_a_resolve_error() {
        let (_, errors) = resolve("return 1;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("top-level"));
    }

    #[test]
    fn this_outside_a_class_is_a_resolve_error() {
        let (_, errors) = resolve("print this;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'this'"));
    }

    #[test]
    fn class_inheriting_from_itself_is_a_resolve_error() {
        let (_, errors) = resolve("class Oops < Oops {}");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn shadowed_block_local_resolves_to_its_own_scope() {
        let (locals, errors) = resolve("{ var a = 1; { var a = 2; print a; } }");
        assert!(errors.is_empty());
        assert_eq!(locals.len(), 1);
    }

    #[test]
    fn reading_local_in_its_own_initializer_is_an_error() {
        let (_, errors) = resolve("{ var a = a; }");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("own initializer"));
    }
}
