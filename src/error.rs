//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime) convert their internal
//! failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow` in the CLI, while still preserving rich diagnostic detail.
//!
//! The module **does not** print diagnostics itself.  The `Display` forms are
//! the user‑facing report formats:
//!
//! | Phase          | Rendering                                    |
//! |----------------|----------------------------------------------|
//! | scan           | `[line N] Error: <message>`                  |
//! | parse, resolve | `[line N] Error at '<lexeme>': <message>`    |
//! | runtime        | `<message>` newline `[line N]`               |

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error {location}: {message}")]
    Parse {
        message: String,
        line: usize,

        /// `at end` or `at '<lexeme>'`.
        location: String,
    },

    /// Static‑analysis failure (self‑referential initializer, misplaced
    /// `return` / `this` / `super`, duplicate declaration).
    #[error("[line {line}] Error {location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error, carrying the line of the offending token.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on the
    /// interpreter's output sink.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Formats the `at ...` part of a compile‑time report for `token`.
fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        "at end".to_string()
    } else {
        format!("at '{}'", token.lexeme)
    }
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            line: token.line,
            location: location_of(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            line: token.line,
            location: location_of(token),
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

/// Outcome of pushing one source text through the whole pipeline.
#[derive(Debug, Error)]
pub enum RunError {
    /// One or more scan / parse / resolve errors; nothing was executed.
    #[error("{}", render_all(.0))]
    Compile(Vec<LoxError>),

    /// An uncaught runtime error aborted the remaining top‑level statements.
    #[error(transparent)]
    Runtime(LoxError),
}

fn render_all(errors: &[LoxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl RunError {
    /// Process exit status the CLI reports for this failure (`sysexits`
    /// `EX_DATAERR` / `EX_SOFTWARE`).
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Compile(_) => 65,
            RunError::Runtime(_) => 70,
        }
    }
}
