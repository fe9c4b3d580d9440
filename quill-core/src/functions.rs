// quill-core - Host function registry for the Quill evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bound host functions.
//!
//! Scripts call functions by name; the host binds them under a
//! (name, arity) key, so the same name can be overloaded on argument
//! count. Resolution distinguishes a name bound at a different arity
//! from a name not bound at all.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use quill_parser::Val;

use crate::error::ErrorKind;

/// The calling convention every bound function is reduced to. The
/// arguments arrive exactly as the script produced them; typed
/// argument checking is layered on top by the embedding API.
pub type RawFn = Rc<dyn Fn(&[Val]) -> std::result::Result<Val, ErrorKind>>;

/// A function bound into the registry.
#[derive(Clone)]
pub struct NativeFn {
    pub name: String,
    pub arity: usize,
    pub func: RawFn,
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({}/{})", self.name, self.arity)
    }
}

/// All functions visible to scripts, keyed by name and arity.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    funcs: HashMap<(String, usize), NativeFn>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        FunctionRegistry {
            funcs: HashMap::new(),
        }
    }

    /// Bind a function. Rebinding the same name and arity replaces
    /// the previous binding.
    pub fn register(&mut self, name: &str, arity: usize, func: RawFn) {
        self.funcs.insert(
            (name.to_string(), arity),
            NativeFn {
                name: name.to_string(),
                arity,
                func,
            },
        );
    }

    /// Look up a binding by name and arity.
    pub fn find(&self, name: &str, arity: usize) -> Option<&NativeFn> {
        self.funcs.get(&(name.to_string(), arity))
    }

    /// True if `name` is bound at any arity.
    pub fn contains_name(&self, name: &str) -> bool {
        self.funcs.keys().any(|(n, _)| n == name)
    }

    /// Every bound name, sorted and deduplicated.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.funcs.keys().map(|(n, _)| n.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Call `name` with `args`. A name bound only at other arities
    /// reports the nearest expected count.
    pub fn call(&self, name: &str, args: &[Val]) -> std::result::Result<Val, ErrorKind> {
        if let Some(native) = self.find(name, args.len()) {
            return (native.func)(args);
        }
        // Bound, but not at this arity.
        let mut arities: Vec<usize> = self
            .funcs
            .keys()
            .filter(|(n, _)| n == name)
            .map(|(_, a)| *a)
            .collect();
        if arities.is_empty() {
            return Err(ErrorKind::FunctionNotFound(name.to_string()));
        }
        arities.sort_unstable();
        let expected = arities
            .iter()
            .min_by_key(|a| a.abs_diff(args.len()))
            .copied()
            .unwrap_or(0);
        Err(ErrorKind::IncorrectParameters {
            name: name.to_string(),
            expected,
            got: args.len(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
