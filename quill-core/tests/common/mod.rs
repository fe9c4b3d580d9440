// quill-core - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared test helpers and utilities for Quill integration tests.
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Available Helpers
//!
//! - [`run_script`] - Run a script in a fresh context with builtins
//! - [`run_script_in`] - Run a script against an existing context
//! - [`run_err_kind`] - Run a script and extract the eval error kind
//! - [`new_context`] - Create a context with built-in functions bound
//!
//! # Macros
//!
//! - [`assert_script!`] - Assert that a script produces an expected value
//! - [`assert_script_err!`] - Assert that a script fails

// Re-export common types for convenience
#[allow(unused_imports)]
pub use quill_core::{
    install_builtins, Context, ErrorKind, Kind, Scope, Script, Val,
};

/// Run a script in a fresh context with the default builtins bound.
///
/// # Returns
///
/// Returns the script's return value (null if it fell off the end),
/// or an error message string.
#[must_use]
pub fn run_script(src: &str) -> Result<Val, String> {
    let mut ctx = Context::new();
    install_builtins(&mut ctx.functions);
    run_script_in(src, &ctx)
}

/// Run a script against an existing context, using a fresh scope.
///
/// # Returns
///
/// Returns the script's return value, or an error message string.
#[must_use]
pub fn run_script_in(src: &str, ctx: &Context) -> Result<Val, String> {
    let mut script = Script::new("test", Scope::new());
    script.add_statements(src).map_err(|e| e.to_string())?;
    script.run(ctx).map_err(|e| e.to_string())
}

/// Run a script and return the kind of the eval error it must
/// produce.
///
/// # Panics
///
/// Panics if the script parses incorrectly or runs to completion.
#[must_use]
#[allow(dead_code)]
pub fn run_err_kind(src: &str) -> ErrorKind {
    let mut ctx = Context::new();
    install_builtins(&mut ctx.functions);
    let mut script = Script::new("test", Scope::new());
    if let Err(e) = script.add_statements(src) {
        panic!("Failed to parse '{}': {}", src, e);
    }
    match script.run(&ctx) {
        Ok(val) => panic!("Expected error for '{}' but got {}", src, val),
        Err(quill_core::Error::Eval(e)) => e.kind,
        Err(other) => panic!("Expected eval error for '{}' but got {}", src, other),
    }
}

/// Create a context with the default builtins bound.
///
/// # Returns
///
/// A fresh [`Context`] with the built-in function set available.
#[must_use]
#[allow(dead_code)]
pub fn new_context() -> Context {
    let mut ctx = Context::new();
    install_builtins(&mut ctx.functions);
    ctx
}

/// Assert that running `input` produces the expected value.
///
/// # Example
///
/// ```ignore
/// assert_script!("return 1 + 2;", Val::Int(3));
/// ```
#[macro_export]
macro_rules! assert_script {
    ($input:expr, $expected:expr) => {
        let result = $crate::common::run_script($input);
        assert!(
            result.is_ok(),
            "Failed to run '{}': {:?}",
            $input,
            result.err()
        );
        assert_eq!(
            result.unwrap(),
            $expected,
            "Run of '{}' did not match expected",
            $input
        );
    };
}

/// Assert that running `input` produces an error.
///
/// # Example
///
/// ```ignore
/// assert_script_err!("return 1 / 0;");
/// ```
#[macro_export]
macro_rules! assert_script_err {
    ($input:expr) => {
        let result = $crate::common::run_script($input);
        assert!(
            result.is_err(),
            "Expected error for '{}' but got {:?}",
            $input,
            result.ok()
        );
    };
}
