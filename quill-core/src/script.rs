// quill-core - Scripts and the script registry
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Parsed scripts.
//!
//! A `Script` owns its statement list and the scope its top level was
//! parsed into. Source can be appended incrementally; line numbering
//! continues across calls so diagnostics stay accurate. The
//! `ScriptRegistry` holds one always-present global script plus any
//! number of named scripts whose scopes hang off the global scope.

use std::collections::HashMap;
use std::rc::Rc;

use quill_parser::{write_stmts, LintEntry, Parser, Scope, Stmt, Val};

use crate::context::Context;
use crate::error::Result;
use crate::eval::{run_block, Flow};

/// A parsed script bound to its scope.
#[derive(Debug)]
pub struct Script {
    name: Rc<str>,
    scope: Scope,
    stmts: Vec<Stmt>,
    next_line: usize,
    lint: Vec<LintEntry>,
}

impl Script {
    pub fn new(name: &str, scope: Scope) -> Self {
        Script {
            name: Rc::from(name),
            scope,
            stmts: Vec::new(),
            next_line: 1,
            lint: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn statements(&self) -> &[Stmt] {
        &self.stmts
    }

    /// Parse `src` and append its statements. Declarations take
    /// effect in the script's scope immediately; the line counter
    /// carries over so a statement added later still reports its
    /// true position.
    pub fn add_statements(&mut self, src: &str) -> Result<()> {
        let mut parser = Parser::new(&self.name, src, self.next_line)?;
        let stmts = parser.parse(&self.scope)?;
        self.next_line = parser.line() + 1;
        self.lint.extend(parser.take_lint());
        self.stmts.extend(stmts);
        Ok(())
    }

    /// Execute the whole script. A `return` stops execution and
    /// yields its value; falling off the end yields null.
    pub fn run(&self, ctx: &Context) -> Result<Val> {
        match run_block(ctx, &self.name, &self.stmts)? {
            Flow::Return(val) => Ok(val),
            Flow::Continue => Ok(Val::Null),
        }
    }

    /// Write the script back out as canonical source.
    pub fn write(&self) -> String {
        let mut out = String::new();
        write_stmts(&mut out, &self.stmts, 0);
        out
    }

    /// Diagnostic spans accumulated over every `add_statements` call.
    pub fn lint(&self) -> &[LintEntry] {
        &self.lint
    }

    /// Drop all statements and replace the scope with a fresh one at
    /// the same point in the chain, forgetting every declaration.
    pub fn clear(&mut self) {
        self.scope = match self.scope.parent() {
            Some(parent) => parent.child(),
            None => Scope::new(),
        };
        self.stmts.clear();
        self.next_line = 1;
        self.lint.clear();
    }
}

/// The global script plus named scripts, sharing one scope chain.
#[derive(Debug)]
pub struct ScriptRegistry {
    global: Script,
    named: HashMap<String, Script>,
}

impl ScriptRegistry {
    /// Create a registry with an empty global script at the root
    /// scope.
    pub fn new() -> Self {
        ScriptRegistry {
            global: Script::new("global", Scope::new()),
            named: HashMap::new(),
        }
    }

    pub fn global(&self) -> &Script {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut Script {
        &mut self.global
    }

    /// The root scope every script hangs off.
    pub fn global_scope(&self) -> &Scope {
        self.global.scope()
    }

    /// Parse `src` as a new named script, replacing any previous
    /// script under that name. Its scope is a child of the global
    /// scope, so global declarations are visible to it.
    pub fn load(&mut self, name: &str, src: &str) -> Result<()> {
        let mut script = Script::new(name, self.global.scope().child());
        script.add_statements(src)?;
        self.named.insert(name.to_string(), script);
        Ok(())
    }

    /// Append statements to an existing named script, creating it
    /// empty first if it does not exist.
    pub fn append(&mut self, name: &str, src: &str) -> Result<()> {
        if !self.named.contains_key(name) {
            let script = Script::new(name, self.global.scope().child());
            self.named.insert(name.to_string(), script);
        }
        if let Some(script) = self.named.get_mut(name) {
            script.add_statements(src)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Script> {
        self.named.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Script> {
        self.named.remove(name)
    }

    /// Named script names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.named.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ScriptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
