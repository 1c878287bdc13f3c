//! loxide is a tree-walking interpreter for Lox, the small dynamically
//! typed language from Bob Nystrom's *Crafting Interpreters*. It has
//! lexical scoping, closures, first-class functions, and single-inheritance
//! classes.
//!
//! ## Pipeline
//! Source text passes through four stages, each feeding the next:
//!
//! 1. [`scanner`] turns characters into a flat list of [`token::Token`]s,
//!    collecting [`error::ScanError`]s for invalid lexemes without stopping.
//! 2. [`parser`] turns tokens into an AST of [`expr::Expr`]/[`stmt::Stmt`]
//!    nodes, recovering from [`error::ParseError`]s at statement boundaries
//!    so multiple mistakes are reported per run.
//! 3. [`resolver`] walks the AST once to compute, for every variable
//!    reference, how many enclosing scopes separate it from its
//!    declaration — the interpreter never has to search the environment
//!    chain. It also catches static mistakes ([`error::ResolveError`]) like
//!    a top-level `return` or a class inheriting from itself.
//! 4. [`interpreter`] walks the AST a second time, evaluating expressions
//!    and executing statements against a chain of [`environment::Environment`]s.
//!
//! A run only reaches interpretation if the scan/parse/resolve stages are
//! all clean — static errors are fatal before a single statement executes.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use error::{ParseError, ResolveError, RuntimeError, ScanError};
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// The outcome of a single [`Lox::run`] call, used by the CLI to choose an
/// exit code: 65 for a static error, 70 for a runtime error.
pub enum RunOutcome {
    Ok,
    StaticError,
    RuntimeError,
}

/// Owns interpreter state across repeated `run` calls (one file, or one
/// line per REPL iteration) and writes program output to `out`.
pub struct Lox<'out> {
    interpreter: Interpreter<'out>,
}

impl<'out> Lox<'out> {
    pub fn new(out: &'out mut dyn Write) -> Self {
        Lox { interpreter: Interpreter::new(out) }
    }

    pub fn run_file(&mut self, path: &str) -> RunOutcome {
        let contents = fs::read_to_string(path).unwrap_or_else(|err| {
            eprintln!("Could not read file '{path}': {err}");
            std::process::exit(74);
        });

        self.run(&contents)
    }

    pub fn run(&mut self, source: &str) -> RunOutcome {
        let (tokens, scan_errors) = Scanner::new(source).scan_tokens();
        report_scan_errors(&scan_errors);

        let (statements, parse_errors) = Parser::new(tokens).parse();
        report_parse_errors(&parse_errors);

        if !scan_errors.is_empty() || !parse_errors.is_empty() {
            return RunOutcome::StaticError;
        }

        let (locals, resolve_errors) = Resolver::new().resolve(&statements);
        report_resolve_errors(&resolve_errors);

        if !resolve_errors.is_empty() {
            return RunOutcome::StaticError;
        }

        self.interpreter.load_resolution(locals);

        match self.interpreter.interpret(&statements) {
            Ok(()) => RunOutcome::Ok,
            Err(error) => {
                report_runtime_error(&error);
                RunOutcome::RuntimeError
            }
        }
    }

    /// A REPL that evaluates one line per iteration against a single
    /// interpreter shared across the whole session, so a `var` declared on
    /// one line is still visible on the next — a static or runtime error
    /// on one line clears before the next line runs, but does not reset
    /// the global environment.
    pub fn run_prompt() {
        let history_path = history_path();
        let mut editor = rustyline::DefaultEditor::new().expect("line editor should initialize");
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        let mut stdout = io::stdout();
        let mut lox = Lox::new(&mut stdout);
        while let Ok(line) = editor.readline("> ") {
            let _ = editor.add_history_entry(&line);
            lox.run(&line);
        }

        if let Some(path) = &history_path {
            let _ = editor.save_history(path);
        }
    }
}

fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".lox_history"))
}

fn report_scan_errors(errors: &[ScanError]) {
    for error in errors {
        eprintln!("{error}");
    }
}

fn report_parse_errors(errors: &[ParseError]) {
    for error in errors {
        eprintln!("{error}");
    }
}

fn report_resolve_errors(errors: &[ResolveError]) {
    for error in errors {
        eprintln!("{error}");
    }
}

fn report_runtime_error(error: &RuntimeError) {
    eprintln!("{error}");
}
