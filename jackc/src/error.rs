// ===============================================
// Metadata — error v0.1.0
// ===============================================
// _component_:     unified compile error
// _description_:   Collects the four failure classes the translator can hit
//                  (lexical, syntactic, semantic, I/O) into one type with a
//                  uniform `Display` so the CLI can report any of them the
//                  same way.
//
// _notes_:
// - No `thiserror`/`anyhow` here; a hand-rolled enum + `Display` is enough
//   and keeps the dependency list short.
// - `From<io::Error>` lets tokenizer/writer construction use `?` directly.
// ===============================================

use std::fmt;
use std::io;

/// Where in the source an error was detected, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Every way a single file's translation can fail.
#[derive(Debug)]
pub enum CompileError {
    /// Malformed token or unterminated string literal.
    Lexical { message: String, at: Position },
    /// Expected token kind/value mismatch.
    Syntactic { message: String, at: Option<Position> },
    /// Name used but not bound in either symbol table, or redefined within
    /// the same scope.
    Semantic { message: String },
    /// Could not open the input file or write the output file.
    Io { message: String },
}

impl CompileError {
    pub fn lexical(message: impl Into<String>, at: Position) -> Self {
        CompileError::Lexical {
            message: message.into(),
            at,
        }
    }

    /// A syntax error with no token-kind wildcard: "`<kind>` token expected: `<value>`".
    pub fn expected(kind: &str, value: &str, at: Option<Position>) -> Self {
        CompileError::Syntactic {
            message: format!("{kind} token expected: {value}"),
            at,
        }
    }

    /// A syntax error where only the token kind mattered: "any `<kind>` token expected".
    pub fn expected_any(kind: &str, at: Option<Position>) -> Self {
        CompileError::Syntactic {
            message: format!("any {kind} token expected"),
            at,
        }
    }

    pub fn undefined_symbol(name: &str) -> Self {
        CompileError::Semantic {
            message: format!("undefined symbol: {name}"),
        }
    }

    pub fn redefined_symbol(name: &str) -> Self {
        CompileError::Semantic {
            message: format!("redefinition of symbol in the same scope: {name}"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lexical { message, at } => {
                write!(f, "lexical error at {at}: {message}")
            }
            CompileError::Syntactic { message, at } => match at {
                Some(pos) => write!(f, "syntax error at {pos}: {message}"),
                None => write!(f, "syntax error: {message}"),
            },
            CompileError::Semantic { message } => write!(f, "semantic error: {message}"),
            CompileError::Io { message } => write!(f, "I/O error: {message}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<io::Error> for CompileError {
    fn from(err: io::Error) -> Self {
        CompileError::Io {
            message: err.to_string(),
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
