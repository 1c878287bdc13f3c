use std::fmt;

use crate::object::Object;
use crate::token::{Token, TokenKind};

/// A lexical error: unexpected character or unterminated string. Reported
/// against a line only, per the scanner's limited positional information.
#[derive(Debug)]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error: {}", self.line, self.message)
    }
}

/// A syntax error produced by the parser, anchored to the offending token.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let where_ = if self.token.kind == TokenKind::Eof {
            " at end".to_string()
        } else {
            format!(" at '{}'", self.token.lexeme)
        };
        write!(f, "[line {}] Error{}: {}", self.token.line, where_, self.message)
    }
}

/// A static-semantic error caught by the resolver (illegal `this`/`super`,
/// duplicate local, use-before-define, illegal `return`).
#[derive(Debug)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let where_ = if self.token.kind == TokenKind::Eof {
            " at end".to_string()
        } else {
            format!(" at '{}'", self.token.lexeme)
        };
        write!(f, "[line {}] Error{}: {}", self.token.line, where_, self.message)
    }
}

/// A runtime error raised while walking the tree, anchored to the token
/// whose evaluation triggered it.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n[line {}]", self.message, self.token.line)
    }
}

/// The interpreter's unwinding control transfer: either a `return` carrying
/// a value out to the nearest function-call boundary, or a runtime error
/// propagating to the top of statement execution. Both bypass ordinary
/// statement continuation, so expression evaluation and statement
/// execution share this single `Result` error type.
#[derive(Debug, Clone)]
pub enum Unwind {
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

pub type EvalResult = Result<Object, Unwind>;
pub type ExecResult = Result<(), Unwind>;
