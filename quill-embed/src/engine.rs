// quill-embed - Engine implementation
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The Engine struct - main entry point for embedding Quill.

use std::rc::Rc;

use quill_core::{
    install_builtins, Context, Error, ErrorKind, RawFn, Result, Script, Trace, Val,
};
use quill_parser::Scope;

use crate::convert::{FromVal, FromValArg, HostResult, IntoVal};

/// A Rust function that can be bound for scripts to call. Implemented
/// for closures of zero to eight [`FromValArg`] parameters returning
/// any [`HostResult`]; the argument count becomes the binding's arity.
pub trait HostFn<Args> {
    fn arity(&self) -> usize;
    fn into_raw(self, name: &str) -> RawFn;
}

macro_rules! impl_host_fn {
    ($count:expr $(, $arg:ident => $idx:tt)*) => {
        #[allow(non_snake_case)]
        impl<F, R $(, $arg)*> HostFn<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + 'static,
            R: HostResult,
            $($arg: FromValArg,)*
        {
            fn arity(&self) -> usize {
                $count
            }

            fn into_raw(self, name: &str) -> RawFn {
                let name = name.to_string();
                Rc::new(move |args: &[Val]| {
                    $(let $arg = $arg::from_arg(&name, $idx, &args[$idx])?;)*
                    (self)($($arg),*).into_host_result()
                })
            }
        }
    };
}

impl_host_fn!(0);
impl_host_fn!(1, A0 => 0);
impl_host_fn!(2, A0 => 0, A1 => 1);
impl_host_fn!(3, A0 => 0, A1 => 1, A2 => 2);
impl_host_fn!(4, A0 => 0, A1 => 1, A2 => 2, A3 => 3);
impl_host_fn!(5, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4);
impl_host_fn!(6, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5);
impl_host_fn!(7, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6);
impl_host_fn!(8, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7);

fn host_trace() -> Trace {
    Trace {
        source: Rc::from("host"),
        line: 0,
        column: 0,
    }
}

/// The Quill scripting engine.
///
/// `Engine` provides a high-level interface for running Quill code,
/// binding Rust functions, and exchanging values with the global
/// scope.
///
/// # Thread Safety
///
/// **`Engine` is NOT thread-safe.** It uses `Rc` and `RefCell`
/// internally for performance in single-threaded contexts. Do not
/// share an `Engine` between threads. If you need concurrent
/// evaluation, create separate `Engine` instances for each thread.
///
/// # Example
///
/// ```rust
/// use quill_embed::Engine;
///
/// let engine = Engine::new();
/// let result = engine.eval("return 1 + 2;").unwrap();
/// assert_eq!(result.to_string(), "3");
/// ```
pub struct Engine {
    context: Context,
}

impl Engine {
    /// Create an Engine with the default built-in functions bound.
    #[must_use]
    pub fn new() -> Self {
        let mut context = Context::new();
        install_builtins(&mut context.functions);
        Engine { context }
    }

    /// Create an Engine with no functions bound at all.
    ///
    /// Useful for sandboxed environments or when the host wants full
    /// control over what scripts can reach.
    #[must_use]
    pub fn new_bare() -> Self {
        Engine {
            context: Context::new(),
        }
    }

    /// Run a fragment of code against the global scope.
    ///
    /// Declarations persist: a variable declared in one `eval` call
    /// is visible to the next, and to [`Engine::get`]. Returns the
    /// fragment's return value, or null if it ran off the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the code fails to lex, parse or run.
    ///
    /// # Example
    ///
    /// ```rust
    /// use quill_embed::Engine;
    ///
    /// let engine = Engine::new();
    /// engine.eval("int x = 42;").unwrap();
    /// let result = engine.eval("return x * 2;").unwrap();
    /// assert_eq!(result.to_string(), "84");
    /// ```
    pub fn eval(&self, code: &str) -> Result<Val> {
        let mut script = Script::new("eval", self.context.scripts.global_scope().clone());
        script.add_statements(code)?;
        script.run(&self.context)
    }

    /// Parse `code` as a named script, replacing any previous script
    /// under that name.
    pub fn load_script(&mut self, name: &str, code: &str) -> Result<()> {
        self.context.scripts.load(name, code)
    }

    /// Append statements to a named script, creating it if needed.
    /// Line numbers continue from the earlier source.
    pub fn append_script(&mut self, name: &str, code: &str) -> Result<()> {
        self.context.scripts.append(name, code)
    }

    /// Run a previously loaded script.
    pub fn run_script(&self, name: &str) -> Result<Val> {
        match self.context.scripts.get(name) {
            Some(script) => script.run(&self.context),
            None => Err(Error::eval(
                host_trace(),
                ErrorKind::Host(format!("no script named '{}'", name)),
            )),
        }
    }

    /// Remove a named script. Returns true if it existed.
    pub fn remove_script(&mut self, name: &str) -> bool {
        self.context.scripts.remove(name).is_some()
    }

    /// Write a loaded script back out as canonical source.
    #[must_use]
    pub fn write_script(&self, name: &str) -> Option<String> {
        self.context.scripts.get(name).map(|s| s.write())
    }

    /// Names of all loaded scripts, sorted.
    #[must_use]
    pub fn script_names(&self) -> Vec<String> {
        self.context.scripts.names()
    }

    /// Read a global variable.
    ///
    /// Returns `None` if nothing by that name is declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Val> {
        self.global_scope().get(name).ok()
    }

    /// Read a global variable as a Rust type.
    ///
    /// Returns `None` if the variable is not declared or cannot be
    /// converted.
    #[must_use]
    pub fn get_as<T: FromVal>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| T::from_val(&v).ok())
    }

    /// Read a global variable as a Rust type, with error details.
    ///
    /// Unlike `get_as`, this method distinguishes between:
    /// - Variable not declared: returns `Ok(None)`
    /// - Conversion error: returns `Err(...)` with the conversion error
    pub fn try_get_as<T: FromVal>(&self, name: &str) -> Result<Option<T>> {
        match self.get(name) {
            Some(v) => T::from_val(&v)
                .map(Some)
                .map_err(|kind| Error::eval(host_trace(), kind)),
            None => Ok(None),
        }
    }

    /// Write a global variable, declaring it with the value's kind if
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable exists with a kind the value
    /// cannot convert to.
    pub fn set(&self, name: &str, value: impl IntoVal) -> Result<()> {
        let val = value.into_val();
        let scope = self.global_scope();
        if !scope.has(name) {
            scope
                .decl_var(name, val.kind())
                .map_err(|e| Error::eval(host_trace(), quill_core::error::var_error_kind(e)))?;
        }
        scope
            .set(name, val)
            .map_err(|e| Error::eval(host_trace(), quill_core::error::var_error_kind(e)))
    }

    /// Bind a typed Rust function for scripts to call.
    ///
    /// The closure's parameter count becomes the arity; arguments are
    /// checked against the parameter types before the closure runs.
    ///
    /// # Example
    ///
    /// ```rust
    /// use quill_embed::Engine;
    ///
    /// let mut engine = Engine::new();
    /// engine.register_fn("hypot", |a: f64, b: f64| (a * a + b * b).sqrt());
    /// let result = engine.eval("return hypot(3.0, 4.0);").unwrap();
    /// assert_eq!(result.to_string(), "5.0");
    /// ```
    pub fn register_fn<Args>(&mut self, name: &str, func: impl HostFn<Args>) {
        let arity = func.arity();
        let raw = func.into_raw(name);
        self.context.functions.register(name, arity, raw);
    }

    /// Bind a raw function taking a `Val` slice.
    ///
    /// This bypasses typed argument checking; the closure sees the
    /// values exactly as the script produced them.
    pub fn register_native(
        &mut self,
        name: &str,
        arity: usize,
        func: impl Fn(&[Val]) -> std::result::Result<Val, ErrorKind> + 'static,
    ) {
        self.context.functions.register(name, arity, Rc::new(func));
    }

    /// Call a bound function from the host side.
    pub fn call(&self, name: &str, args: &[Val]) -> Result<Val> {
        self.context.run_function(&host_trace(), name, args)
    }

    /// Every bound function name, sorted.
    #[must_use]
    pub fn function_names(&self) -> Vec<String> {
        self.context.function_names()
    }

    /// Access the underlying context, for advanced use.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    fn global_scope(&self) -> &Scope {
        self.context.scripts.global_scope()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
