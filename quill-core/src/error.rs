// quill-core - Error types for the Quill evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for Quill evaluation.

use std::fmt;
use std::rc::Rc;

use quill_parser::{CastError, Kind, LexError, ParseError, Pos, VarError};

/// Result type for Quill evaluation.
pub type Result<T> = std::result::Result<T, Error>;

/// Where a runtime error happened: the owning script and the source
/// position of the statement or expression being evaluated.
#[derive(Debug, Clone)]
pub struct Trace {
    pub source: Rc<str>,
    pub line: usize,
    pub column: usize,
}

impl Trace {
    pub fn new(source: &Rc<str>, pos: Pos) -> Self {
        Trace {
            source: source.clone(),
            line: pos.line,
            column: pos.column,
        }
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// What went wrong during evaluation.
#[derive(Debug, Clone)]
pub enum ErrorKind {
    /// No function registered under this name at any arity
    FunctionNotFound(String),
    /// Function exists but not at this argument count
    IncorrectParameters {
        name: String,
        expected: usize,
        got: usize,
    },
    /// Argument value has no conversion to the parameter's type
    ArgumentTypeMismatch {
        name: String,
        index: usize,
        expected: Kind,
        got: Kind,
    },
    /// Variable not declared in any enclosing scope
    VariableNotFound(String),
    /// Name already declared in the same scope
    DuplicateVariable(String),
    /// Assigned value has no conversion to the variable's type
    InvalidAssignment { name: String, from: Kind, to: Kind },
    /// Conversion requested between incompatible kinds
    InvalidCast { from: Kind, to: Kind },
    /// No operator handler for this operand kind combination
    IncompatibleOperator { op: String, operands: String },
    /// Index past the end of an array or vector
    IndexOutOfRange { index: i64, length: usize },
    /// Indexing applied to a non-indexable value
    IndexOnNonArray(Kind),
    /// Condition of if/while/for did not evaluate to bool
    NonBooleanCondition(Kind),
    /// Integer division or modulo by zero
    DivisionByZero,
    /// A bound host function reported a failure
    Host(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::FunctionNotFound(name) => {
                write!(f, "function not found: {}", name)
            }
            ErrorKind::IncorrectParameters {
                name,
                expected,
                got,
            } => {
                write!(
                    f,
                    "wrong number of arguments to {}: expected {}, got {}",
                    name, expected, got
                )
            }
            ErrorKind::ArgumentTypeMismatch {
                name,
                index,
                expected,
                got,
            } => {
                write!(
                    f,
                    "argument {} to {} expects {}, got {}",
                    index + 1,
                    name,
                    expected,
                    got
                )
            }
            ErrorKind::VariableNotFound(name) => {
                write!(f, "variable not found: {}", name)
            }
            ErrorKind::DuplicateVariable(name) => {
                write!(f, "variable '{}' is already declared in this scope", name)
            }
            ErrorKind::InvalidAssignment { name, from, to } => {
                write!(f, "cannot assign {} to '{}' of type {}", from, name, to)
            }
            ErrorKind::InvalidCast { from, to } => {
                write!(f, "cannot convert {} to {}", from, to)
            }
            ErrorKind::IncompatibleOperator { op, operands } => {
                write!(f, "operator '{}' is not defined for {}", op, operands)
            }
            ErrorKind::IndexOutOfRange { index, length } => {
                write!(f, "index {} out of range for length {}", index, length)
            }
            ErrorKind::IndexOnNonArray(kind) => {
                write!(f, "cannot index a value of type {}", kind)
            }
            ErrorKind::NonBooleanCondition(kind) => {
                write!(f, "condition must be bool, got {}", kind)
            }
            ErrorKind::DivisionByZero => write!(f, "division by zero"),
            ErrorKind::Host(message) => write!(f, "{}", message),
        }
    }
}

/// A runtime error with its source trace.
#[derive(Debug, Clone)]
pub struct EvalError {
    pub trace: Trace,
    pub kind: ErrorKind,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Eval error at {}: {}", self.trace, self.kind)
    }
}

impl std::error::Error for EvalError {}

/// Any failure a script can produce, from lexing through evaluation.
#[derive(Debug, Clone)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
    Eval(EvalError),
}

impl Error {
    /// Build an evaluation error at the given trace.
    pub fn eval(trace: Trace, kind: ErrorKind) -> Self {
        Error::Eval(EvalError { trace, kind })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(e) => write!(f, "{}", e),
            Error::Parse(e) => write!(f, "{}", e),
            Error::Eval(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}

/// Map a scope failure into the evaluator's error vocabulary.
pub fn var_error_kind(e: VarError) -> ErrorKind {
    match e {
        VarError::NotFound(name) => ErrorKind::VariableNotFound(name),
        VarError::Duplicate(name) => ErrorKind::DuplicateVariable(name),
        VarError::InvalidAssignment { name, from, to } => {
            ErrorKind::InvalidAssignment { name, from, to }
        }
        VarError::NotIndexable { kind, .. } => ErrorKind::IndexOnNonArray(kind),
        VarError::IndexOutOfRange { index, length } => {
            ErrorKind::IndexOutOfRange { index, length }
        }
    }
}

/// Map a conversion failure into the evaluator's error vocabulary.
pub fn cast_error_kind(e: CastError) -> ErrorKind {
    ErrorKind::InvalidCast {
        from: e.from,
        to: e.to,
    }
}

// ============================================================================
// Tests
// ============================================================================
