// quill-core - Built-in functions for Quill scripts
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The default function set: console output, string helpers, the math
//! family and random numbers. Hosts that want a clean slate skip
//! installing these and bind their own.

use std::cell::Cell;
use std::rc::Rc;

use quill_parser::{Kind, Val};

use crate::error::ErrorKind;
use crate::functions::FunctionRegistry;

type OpResult = std::result::Result<Val, ErrorKind>;

fn want_number(name: &str, index: usize, val: &Val) -> std::result::Result<f64, ErrorKind> {
    match val {
        Val::Int(n) => Ok(*n as f64),
        Val::Float(n) => Ok(*n),
        other => Err(ErrorKind::ArgumentTypeMismatch {
            name: name.to_string(),
            index,
            expected: Kind::Float,
            got: other.kind(),
        }),
    }
}

fn want_int(name: &str, index: usize, val: &Val) -> std::result::Result<i64, ErrorKind> {
    match val {
        Val::Int(n) => Ok(*n),
        other => Err(ErrorKind::ArgumentTypeMismatch {
            name: name.to_string(),
            index,
            expected: Kind::Int,
            got: other.kind(),
        }),
    }
}

// ============================================================================
// Random Number Generation
// ============================================================================

// LCG constants (same as used in glibc)
const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;

thread_local! {
    /// Persistent RNG state, seeded lazily from system time.
    static RNG_STATE: Cell<u64> = const { Cell::new(0) };
    static RNG_SEEDED: Cell<bool> = const { Cell::new(false) };
}

/// Get the next random u64, advancing the RNG state.
fn next_random_u64() -> u64 {
    RNG_STATE.with(|state| {
        RNG_SEEDED.with(|seeded| {
            if !seeded.get() {
                // Seed lazily from system time
                use std::time::{SystemTime, UNIX_EPOCH};
                let seed = match SystemTime::now().duration_since(UNIX_EPOCH) {
                    Ok(elapsed) => elapsed.as_nanos() as u64,
                    Err(_) => 0x9e3779b97f4a7c15,
                };
                state.set(seed);
                seeded.set(true);
            }
        });
        let current = state.get();
        let next = current
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        state.set(next);
        next
    })
}

/// Get a random f64 in [0, 1).
fn next_random_f64() -> f64 {
    (next_random_u64() >> 11) as f64 / (1u64 << 53) as f64
}

// ============================================================================
// Installation
// ============================================================================

/// Bind the default function set into `registry`.
pub fn install(registry: &mut FunctionRegistry) {
    registry.register(
        "print",
        1,
        Rc::new(|args| {
            println!("{}", args[0].to_text());
            Ok(Val::Null)
        }),
    );

    registry.register(
        "str",
        1,
        Rc::new(|args| -> OpResult { Ok(Val::str(args[0].to_text())) }),
    );

    registry.register(
        "strlen",
        1,
        Rc::new(|args| match &args[0] {
            Val::Str(s) => Ok(Val::Int(s.chars().count() as i64)),
            other => Err(ErrorKind::ArgumentTypeMismatch {
                name: "strlen".to_string(),
                index: 0,
                expected: Kind::Str,
                got: other.kind(),
            }),
        }),
    );

    registry.register(
        "len",
        1,
        Rc::new(|args| match &args[0] {
            Val::Array(arr) => Ok(Val::Int(arr.len() as i64)),
            Val::Float2(_) => Ok(Val::Int(2)),
            Val::Float3(_) => Ok(Val::Int(3)),
            Val::Float4(_) => Ok(Val::Int(4)),
            other => Err(ErrorKind::IndexOnNonArray(other.kind())),
        }),
    );

    // abs keeps the operand kind; the rest of the math family works
    // in floats.
    registry.register(
        "abs",
        1,
        Rc::new(|args| match &args[0] {
            Val::Int(n) => Ok(Val::Int(n.wrapping_abs())),
            Val::Float(n) => Ok(Val::Float(n.abs())),
            other => Err(ErrorKind::ArgumentTypeMismatch {
                name: "abs".to_string(),
                index: 0,
                expected: Kind::Float,
                got: other.kind(),
            }),
        }),
    );

    registry.register(
        "min",
        2,
        Rc::new(|args| match (&args[0], &args[1]) {
            (Val::Int(a), Val::Int(b)) => Ok(Val::Int(*a.min(b))),
            _ => {
                let a = want_number("min", 0, &args[0])?;
                let b = want_number("min", 1, &args[1])?;
                Ok(Val::Float(a.min(b)))
            }
        }),
    );

    registry.register(
        "max",
        2,
        Rc::new(|args| match (&args[0], &args[1]) {
            (Val::Int(a), Val::Int(b)) => Ok(Val::Int(*a.max(b))),
            _ => {
                let a = want_number("max", 0, &args[0])?;
                let b = want_number("max", 1, &args[1])?;
                Ok(Val::Float(a.max(b)))
            }
        }),
    );

    registry.register(
        "floor",
        1,
        Rc::new(|args| Ok(Val::Float(want_number("floor", 0, &args[0])?.floor()))),
    );

    registry.register(
        "ceil",
        1,
        Rc::new(|args| Ok(Val::Float(want_number("ceil", 0, &args[0])?.ceil()))),
    );

    registry.register(
        "sqrt",
        1,
        Rc::new(|args| Ok(Val::Float(want_number("sqrt", 0, &args[0])?.sqrt()))),
    );

    registry.register(
        "sin",
        1,
        Rc::new(|args| Ok(Val::Float(want_number("sin", 0, &args[0])?.sin()))),
    );

    registry.register(
        "cos",
        1,
        Rc::new(|args| Ok(Val::Float(want_number("cos", 0, &args[0])?.cos()))),
    );

    registry.register(
        "pow",
        2,
        Rc::new(|args| {
            let base = want_number("pow", 0, &args[0])?;
            let exp = want_number("pow", 1, &args[1])?;
            Ok(Val::Float(base.powf(exp)))
        }),
    );

    registry.register(
        "clamp",
        3,
        Rc::new(|args| {
            let v = want_number("clamp", 0, &args[0])?;
            let lo = want_number("clamp", 1, &args[1])?;
            let hi = want_number("clamp", 2, &args[2])?;
            Ok(Val::Float(v.max(lo).min(hi)))
        }),
    );

    registry.register(
        "lerp",
        3,
        Rc::new(|args| {
            let a = want_number("lerp", 0, &args[0])?;
            let b = want_number("lerp", 1, &args[1])?;
            let t = want_number("lerp", 2, &args[2])?;
            Ok(Val::Float(a + (b - a) * t))
        }),
    );

    registry.register("rand", 0, Rc::new(|_| Ok(Val::Float(next_random_f64()))));

    registry.register(
        "randrange",
        2,
        Rc::new(|args| {
            let lo = want_int("randrange", 0, &args[0])?;
            let hi = want_int("randrange", 1, &args[1])?;
            if hi <= lo {
                return Err(ErrorKind::Host(format!(
                    "randrange: empty range {}..{}",
                    lo, hi
                )));
            }
            let span = (hi - lo) as u64;
            Ok(Val::Int(lo + (next_random_u64() % span) as i64))
        }),
    );
}

// ============================================================================
// Tests
// ============================================================================
