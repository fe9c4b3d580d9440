// quill-core - Execution context for the Quill evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The execution context: everything the host has bound for scripts
//! to use. A context owns the function registry and the script
//! registry; the evaluator only ever borrows it.

use quill_parser::Val;

use crate::error::{Error, Result, Trace};
use crate::functions::{FunctionRegistry, RawFn};
use crate::script::ScriptRegistry;

/// Host-visible state shared by every script run.
#[derive(Debug, Default)]
pub struct Context {
    pub functions: FunctionRegistry,
    pub scripts: ScriptRegistry,
}

impl Context {
    pub fn new() -> Self {
        Context {
            functions: FunctionRegistry::new(),
            scripts: ScriptRegistry::new(),
        }
    }

    /// Bind a raw function under a name and arity.
    pub fn register(&mut self, name: &str, arity: usize, func: RawFn) {
        self.functions.register(name, arity, func);
    }

    /// Call a bound function, attributing any failure to `trace`.
    pub fn run_function(&self, trace: &Trace, name: &str, args: &[Val]) -> Result<Val> {
        self.functions
            .call(name, args)
            .map_err(|kind| Error::eval(trace.clone(), kind))
    }

    /// Every bound function name, sorted.
    pub fn function_names(&self) -> Vec<String> {
        self.functions.names()
    }
}
