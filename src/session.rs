//! Pipeline driver: scan → parse → resolve → interpret.
//!
//! A [`Lox`] session keeps one interpreter alive across several runs (the
//! interactive prompt feeds it one line at a time), together with the
//! expression‑id counter, so closures and resolver distances recorded by an
//! earlier run stay valid in later ones.

use std::io::Write;

use log::{debug, info};

use crate::error::RunError;
use crate::expr::Expr;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;
use crate::stmt::Stmt;
use crate::value::Value;

pub struct Lox {
    interpreter: Interpreter,
    next_id: usize,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// A session printing to stdout.
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    /// A session whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self::with_interpreter(Interpreter::with_output(out))
    }

    fn with_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            next_id: 0,
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Runs `source` as a program.  Nothing executes when any compile‑time
    /// error was found; every such error is returned at once.
    pub fn run(&mut self, source: &str) -> Result<(), RunError> {
        let statements: Vec<Stmt> = self.compile(source)?;

        info!("Executing {} top-level statement(s)", statements.len());

        self.interpreter
            .interpret(&statements)
            .map_err(RunError::Runtime)
    }

    /// Scans, parses and resolves `source` without executing it.
    pub fn compile(&mut self, source: &str) -> Result<Vec<Stmt>, RunError> {
        let (tokens, mut errors) = scan_tokens(source);

        let mut parser = Parser::with_first_id(tokens, self.next_id);
        let parsed = parser.parse();
        self.next_id = parser.next_id();

        let statements: Vec<Stmt> = match parsed {
            Ok(statements) => statements,
            Err(parse_errors) => {
                errors.extend(parse_errors);
                return Err(RunError::Compile(errors));
            }
        };

        if !errors.is_empty() {
            return Err(RunError::Compile(errors));
        }

        Resolver::new(&mut self.interpreter)
            .resolve(&statements)
            .map_err(RunError::Compile)?;

        debug!("Compiled {} statement(s)", statements.len());

        Ok(statements)
    }

    /// Evaluates `source` as one expression in the global frame.
    pub fn evaluate(&mut self, source: &str) -> Result<Value, RunError> {
        let (tokens, mut errors) = scan_tokens(source);

        let mut parser = Parser::with_first_id(tokens, self.next_id);
        let parsed = parser.parse_expression();
        self.next_id = parser.next_id();

        let expr: Expr = match parsed {
            Ok(expr) if errors.is_empty() => expr,
            Ok(_) => return Err(RunError::Compile(errors)),
            Err(parse_errors) => {
                errors.extend(parse_errors);
                return Err(RunError::Compile(errors));
            }
        };

        Resolver::new(&mut self.interpreter)
            .resolve_expression(&expr)
            .map_err(RunError::Compile)?;

        self.interpreter
            .evaluate(&expr)
            .map_err(RunError::Runtime)
    }
}
