// quill-core - Runtime and evaluator for the Quill scripting language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # quill-core
//!
//! Runtime and evaluator for the Quill scripting language. Provides
//! an AST-walking interpreter over the nodes `quill-parser` produces,
//! a table-driven operator engine, the host function registry and the
//! script registry.

pub mod builtins;
pub mod context;
pub mod error;
pub mod eval;
pub mod functions;
pub mod ops;
pub mod script;

pub use builtins::install as install_builtins;
pub use context::Context;
pub use error::{Error, ErrorKind, EvalError, Result, Trace};
pub use eval::{eval_expr, exec_stmt, run_block, Flow};
pub use functions::{FunctionRegistry, NativeFn, RawFn};
pub use script::{Script, ScriptRegistry};

// Re-export parser types for convenience
pub use quill_parser::{ArrayVal, ElemKind, Kind, Scope, Val};
