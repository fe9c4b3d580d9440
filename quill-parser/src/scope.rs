// quill-parser - Scope chain for Quill variables
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Hierarchical variable scopes.
//!
//! Scopes form a chain through parent references. Each scope owns a
//! name-to-slot map where every slot remembers its declared kind; all
//! writes re-coerce against that kind. Scopes are created once per
//! lexical block at parse time and reused across executions - a loop
//! body's storage is overwritten each iteration, never reallocated.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::value::{Kind, Val};

/// A variable resolution or assignment failure.
#[derive(Debug, Clone, PartialEq)]
pub enum VarError {
    /// Name not declared anywhere up the chain.
    NotFound(String),
    /// Name already declared in the same scope.
    Duplicate(String),
    /// Assigned value has no conversion to the declared kind.
    InvalidAssignment { name: String, from: Kind, to: Kind },
    /// Indexed assignment against a non-indexable slot.
    NotIndexable { name: String, kind: Kind },
    /// Indexed assignment past the end of the storage.
    IndexOutOfRange { index: i64, length: usize },
}

impl fmt::Display for VarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarError::NotFound(name) => write!(f, "variable not found: {}", name),
            VarError::Duplicate(name) => {
                write!(f, "variable '{}' is already declared in this scope", name)
            }
            VarError::InvalidAssignment { name, from, to } => {
                write!(f, "cannot assign {} to '{}' of type {}", from, name, to)
            }
            VarError::NotIndexable { name, kind } => {
                write!(f, "'{}' of type {} cannot be indexed", name, kind)
            }
            VarError::IndexOutOfRange { index, length } => {
                write!(f, "index {} out of range for length {}", index, length)
            }
        }
    }
}

impl std::error::Error for VarError {}

#[derive(Debug)]
struct Slot {
    kind: Kind,
    val: Val,
}

#[derive(Debug)]
struct ScopeInner {
    vars: HashMap<String, Slot>,
    /// Declaration-ordered names bound by the enclosing construct
    /// (foreach loop variables); editor tooling lists them.
    params: Vec<String>,
    parent: Option<Scope>,
    level: usize,
}

/// One level of the lexical scope chain.
///
/// Cloning a `Scope` clones the handle, not the storage: AST nodes
/// capture their scope at parse time and share it with the evaluator.
#[derive(Debug, Clone)]
pub struct Scope {
    inner: Rc<RefCell<ScopeInner>>,
}

impl Scope {
    /// Create the global scope (level 0).
    pub fn new() -> Self {
        Scope {
            inner: Rc::new(RefCell::new(ScopeInner {
                vars: HashMap::new(),
                params: Vec::new(),
                parent: None,
                level: 0,
            })),
        }
    }

    /// Create a child scope one level below this one.
    #[must_use]
    pub fn child(&self) -> Self {
        let level = self.level() + 1;
        Scope {
            inner: Rc::new(RefCell::new(ScopeInner {
                vars: HashMap::new(),
                params: Vec::new(),
                parent: Some(self.clone()),
                level,
            })),
        }
    }

    /// Depth from the global scope (global = 0).
    pub fn level(&self) -> usize {
        self.inner.borrow().level
    }

    pub fn parent(&self) -> Option<Scope> {
        self.inner.borrow().parent.clone()
    }

    /// Declare a variable in this scope with the kind's default value.
    /// Shadowing an outer name is allowed; redeclaring a name in the
    /// same scope is not.
    pub fn decl_var(&self, name: &str, kind: Kind) -> Result<(), VarError> {
        let mut inner = self.inner.borrow_mut();
        if inner.vars.contains_key(name) {
            return Err(VarError::Duplicate(name.to_string()));
        }
        inner.vars.insert(
            name.to_string(),
            Slot {
                kind,
                val: kind.default_val(),
            },
        );
        Ok(())
    }

    /// Declare a construct-bound variable (foreach loop variable) and
    /// record it in the ordered parameter list.
    pub fn decl_param(&self, name: &str, kind: Kind) -> Result<(), VarError> {
        self.decl_var(name, kind)?;
        self.inner.borrow_mut().params.push(name.to_string());
        Ok(())
    }

    /// Names declared through `decl_param`, in declaration order.
    pub fn params(&self) -> Vec<String> {
        self.inner.borrow().params.clone()
    }

    /// True if `name` resolves in this scope or any parent.
    pub fn has(&self, name: &str) -> bool {
        let mut current = self.clone();
        loop {
            let inner = current.inner.borrow();
            if inner.vars.contains_key(name) {
                return true;
            }
            let parent = inner.parent.clone();
            drop(inner);
            match parent {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// True if `name` is declared in this scope itself.
    pub fn has_local(&self, name: &str) -> bool {
        self.inner.borrow().vars.contains_key(name)
    }

    /// Declared kind of a variable, walking the chain.
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        let mut current = self.clone();
        loop {
            let inner = current.inner.borrow();
            if let Some(slot) = inner.vars.get(name) {
                return Some(slot.kind);
            }
            let parent = inner.parent.clone();
            drop(inner);
            match parent {
                Some(p) => current = p,
                None => return None,
            }
        }
    }

    /// Read a variable, walking the chain. Iterative traversal, like
    /// every walk here, so deep chains cannot overflow the stack.
    pub fn get(&self, name: &str) -> Result<Val, VarError> {
        let mut current = self.clone();
        loop {
            let inner = current.inner.borrow();
            if let Some(slot) = inner.vars.get(name) {
                return Ok(slot.val.clone());
            }
            let parent = inner.parent.clone();
            drop(inner);
            match parent {
                Some(p) => current = p,
                None => return Err(VarError::NotFound(name.to_string())),
            }
        }
    }

    /// Write a variable where it is declared, re-coercing the value
    /// against the slot's declared kind.
    pub fn set(&self, name: &str, val: Val) -> Result<(), VarError> {
        let mut current = self.clone();
        loop {
            {
                let mut inner = current.inner.borrow_mut();
                if let Some(slot) = inner.vars.get_mut(name) {
                    let coerced =
                        val.convert(slot.kind)
                            .map_err(|e| VarError::InvalidAssignment {
                                name: name.to_string(),
                                from: e.from,
                                to: e.to,
                            })?;
                    slot.val = coerced;
                    return Ok(());
                }
            }
            let parent = current.inner.borrow().parent.clone();
            match parent {
                Some(p) => current = p,
                None => return Err(VarError::NotFound(name.to_string())),
            }
        }
    }

    /// Indexed write: mutate an array element in place (coercing to
    /// the element kind) or rebuild a vector value with one component
    /// replaced.
    pub fn set_index(&self, name: &str, index: i64, val: Val) -> Result<(), VarError> {
        let current = self.get(name)?;
        match current {
            Val::Array(arr) => {
                let len = arr.len();
                if index < 0 || index as usize >= len {
                    return Err(VarError::IndexOutOfRange { index, length: len });
                }
                let coerced = val.convert(arr.elem().scalar()).map_err(|e| {
                    VarError::InvalidAssignment {
                        name: name.to_string(),
                        from: e.from,
                        to: e.to,
                    }
                })?;
                arr.set(index as usize, coerced);
                Ok(())
            }
            Val::Float2(v) => self.set_component(name, &v, index, val),
            Val::Float3(v) => self.set_component(name, &v, index, val),
            Val::Float4(v) => self.set_component(name, &v, index, val),
            other => Err(VarError::NotIndexable {
                name: name.to_string(),
                kind: other.kind(),
            }),
        }
    }

    fn set_component(
        &self,
        name: &str,
        parts: &[f64],
        index: i64,
        val: Val,
    ) -> Result<(), VarError> {
        if index < 0 || index as usize >= parts.len() {
            return Err(VarError::IndexOutOfRange {
                index,
                length: parts.len(),
            });
        }
        let component = val
            .convert(Kind::Float)
            .map_err(|e| VarError::InvalidAssignment {
                name: name.to_string(),
                from: e.from,
                to: e.to,
            })?;
        let Val::Float(n) = component else {
            return Err(VarError::InvalidAssignment {
                name: name.to_string(),
                from: val.kind(),
                to: Kind::Float,
            });
        };
        let mut rebuilt = parts.to_vec();
        rebuilt[index as usize] = n;
        let replacement = match rebuilt.len() {
            2 => Val::Float2([rebuilt[0], rebuilt[1]]),
            3 => Val::Float3([rebuilt[0], rebuilt[1], rebuilt[2]]),
            _ => Val::Float4([rebuilt[0], rebuilt[1], rebuilt[2], rebuilt[3]]),
        };
        self.set(name, replacement)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
