// quill-embed - Type conversion traits
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Type conversion between Rust and Quill values.
//!
//! This module provides the [`IntoVal`] and [`FromVal`] traits for
//! moving values across the host boundary, and the stricter
//! [`FromValArg`] used for typed function parameters.
//!
//! # Built-in Conversions
//!
//! | Rust Type | Quill Type |
//! |-----------|------------|
//! | `()` | `null` |
//! | `bool` | `bool` |
//! | `i32`, `i64`, `usize` | `int` |
//! | `f32`, `f64` | `float` |
//! | `String`, `&str` | `string` |
//! | `[f64; 2..=4]` | `float2`..`float4` |
//! | `Vec<bool/i64/f64/String>` | `bool[]`/`int[]`/`float[]`/`string[]` |
//! | `Option<T>` | `T` or `null` |
//!
//! `FromVal` is lenient the way variable assignment is: an int reads
//! out as `f64`, a null reads as `None`. `FromValArg` is what bound
//! function parameters use and accepts only the exact kind, plus the
//! int-to-float widening the operator engine performs.

use std::rc::Rc;

use quill_core::ErrorKind;
use quill_parser::{ArrayVal, ElemKind, Kind, Val};

/// Convert a Rust value into a Quill `Val`.
pub trait IntoVal {
    fn into_val(self) -> Val;
}

/// Convert a Quill `Val` into a Rust value.
pub trait FromVal: Sized {
    fn from_val(val: &Val) -> Result<Self, ErrorKind>;
}

fn cast_err(from: &Val, to: Kind) -> ErrorKind {
    ErrorKind::InvalidCast {
        from: from.kind(),
        to,
    }
}

// ============================================================================
// IntoVal implementations
// ============================================================================

impl IntoVal for Val {
    fn into_val(self) -> Val {
        self
    }
}

impl IntoVal for () {
    fn into_val(self) -> Val {
        Val::Null
    }
}

impl IntoVal for bool {
    fn into_val(self) -> Val {
        Val::Bool(self)
    }
}

impl IntoVal for i64 {
    fn into_val(self) -> Val {
        Val::Int(self)
    }
}

impl IntoVal for i32 {
    fn into_val(self) -> Val {
        Val::Int(self as i64)
    }
}

impl IntoVal for usize {
    fn into_val(self) -> Val {
        Val::Int(self as i64)
    }
}

impl IntoVal for f64 {
    fn into_val(self) -> Val {
        Val::Float(self)
    }
}

impl IntoVal for f32 {
    fn into_val(self) -> Val {
        Val::Float(self as f64)
    }
}

impl IntoVal for String {
    fn into_val(self) -> Val {
        Val::str(self)
    }
}

impl IntoVal for &str {
    fn into_val(self) -> Val {
        Val::str(self)
    }
}

impl IntoVal for Rc<str> {
    fn into_val(self) -> Val {
        Val::Str(self)
    }
}

impl IntoVal for [f64; 2] {
    fn into_val(self) -> Val {
        Val::Float2(self)
    }
}

impl IntoVal for [f64; 3] {
    fn into_val(self) -> Val {
        Val::Float3(self)
    }
}

impl IntoVal for [f64; 4] {
    fn into_val(self) -> Val {
        Val::Float4(self)
    }
}

impl IntoVal for Vec<bool> {
    fn into_val(self) -> Val {
        Val::array(ElemKind::Bool, self.into_iter().map(Val::Bool))
    }
}

impl IntoVal for Vec<i64> {
    fn into_val(self) -> Val {
        Val::array(ElemKind::Int, self.into_iter().map(Val::Int))
    }
}

impl IntoVal for Vec<f64> {
    fn into_val(self) -> Val {
        Val::array(ElemKind::Float, self.into_iter().map(Val::Float))
    }
}

impl IntoVal for Vec<String> {
    fn into_val(self) -> Val {
        Val::array(ElemKind::Str, self.into_iter().map(Val::str))
    }
}

impl<T: IntoVal> IntoVal for Option<T> {
    fn into_val(self) -> Val {
        match self {
            Some(v) => v.into_val(),
            None => Val::Null,
        }
    }
}

// ============================================================================
// FromVal implementations
// ============================================================================

impl FromVal for Val {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        Ok(val.clone())
    }
}

impl FromVal for () {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Null => Ok(()),
            other => Err(cast_err(other, Kind::Null)),
        }
    }
}

impl FromVal for bool {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Bool(b) => Ok(*b),
            other => Err(cast_err(other, Kind::Bool)),
        }
    }
}

impl FromVal for i64 {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Int(n) => Ok(*n),
            other => Err(cast_err(other, Kind::Int)),
        }
    }
}

impl FromVal for i32 {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Int(n) if *n >= i32::MIN as i64 && *n <= i32::MAX as i64 => Ok(*n as i32),
            other => Err(cast_err(other, Kind::Int)),
        }
    }
}

impl FromVal for usize {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Int(n) if *n >= 0 => Ok(*n as usize),
            other => Err(cast_err(other, Kind::Int)),
        }
    }
}

impl FromVal for f64 {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Float(n) => Ok(*n),
            Val::Int(n) => Ok(*n as f64),
            other => Err(cast_err(other, Kind::Float)),
        }
    }
}

impl FromVal for f32 {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        f64::from_val(val).map(|n| n as f32)
    }
}

impl FromVal for String {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Str(s) => Ok(s.to_string()),
            other => Err(cast_err(other, Kind::Str)),
        }
    }
}

impl FromVal for Rc<str> {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Str(s) => Ok(s.clone()),
            other => Err(cast_err(other, Kind::Str)),
        }
    }
}

impl FromVal for [f64; 2] {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Float2(parts) => Ok(*parts),
            other => Err(cast_err(other, Kind::Float2)),
        }
    }
}

impl FromVal for [f64; 3] {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Float3(parts) => Ok(*parts),
            other => Err(cast_err(other, Kind::Float3)),
        }
    }
}

impl FromVal for [f64; 4] {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Float4(parts) => Ok(*parts),
            other => Err(cast_err(other, Kind::Float4)),
        }
    }
}

fn array_items(val: &Val, elem: ElemKind) -> Result<ArrayVal, ErrorKind> {
    match val {
        Val::Array(arr) if arr.elem() == elem => Ok(arr.clone()),
        other => Err(cast_err(other, Kind::Array(elem))),
    }
}

impl FromVal for Vec<bool> {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        let arr = array_items(val, ElemKind::Bool)?;
        arr.snapshot().iter().map(bool::from_val).collect()
    }
}

impl FromVal for Vec<i64> {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        let arr = array_items(val, ElemKind::Int)?;
        arr.snapshot().iter().map(i64::from_val).collect()
    }
}

impl FromVal for Vec<f64> {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        let arr = array_items(val, ElemKind::Float)?;
        arr.snapshot().iter().map(f64::from_val).collect()
    }
}

impl FromVal for Vec<String> {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        let arr = array_items(val, ElemKind::Str)?;
        arr.snapshot().iter().map(String::from_val).collect()
    }
}

impl<T: FromVal> FromVal for Option<T> {
    fn from_val(val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Null => Ok(None),
            other => T::from_val(other).map(Some),
        }
    }
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Convert a Rust value into a `Val`.
#[must_use]
pub fn to_val<T: IntoVal>(value: T) -> Val {
    value.into_val()
}

/// Convert a `Val` into a Rust type.
pub fn from_val<T: FromVal>(val: &Val) -> Result<T, ErrorKind> {
    T::from_val(val)
}

// ============================================================================
// Typed function parameters
// ============================================================================

/// A typed parameter of a bound function. Unlike [`FromVal`] this is
/// strict: only the exact kind is accepted, plus the int-to-float
/// widening scripts already get from the operator engine, and the
/// failure names the function and parameter position.
pub trait FromValArg: Sized {
    fn from_arg(name: &str, index: usize, val: &Val) -> Result<Self, ErrorKind>;
}

fn arg_err(name: &str, index: usize, expected: Kind, val: &Val) -> ErrorKind {
    ErrorKind::ArgumentTypeMismatch {
        name: name.to_string(),
        index,
        expected,
        got: val.kind(),
    }
}

/// Parameters that require one exact kind.
macro_rules! strict_arg {
    ($ty:ty, $kind:expr, $pat:pat => $out:expr) => {
        impl FromValArg for $ty {
            fn from_arg(name: &str, index: usize, val: &Val) -> Result<Self, ErrorKind> {
                match val {
                    $pat => Ok($out),
                    other => Err(arg_err(name, index, $kind, other)),
                }
            }
        }
    };
}

strict_arg!(bool, Kind::Bool, Val::Bool(b) => *b);
strict_arg!(i64, Kind::Int, Val::Int(n) => *n);
strict_arg!(String, Kind::Str, Val::Str(s) => s.to_string());
strict_arg!(Rc<str>, Kind::Str, Val::Str(s) => s.clone());
strict_arg!([f64; 2], Kind::Float2, Val::Float2(parts) => *parts);
strict_arg!([f64; 3], Kind::Float3, Val::Float3(parts) => *parts);
strict_arg!([f64; 4], Kind::Float4, Val::Float4(parts) => *parts);

impl FromValArg for f64 {
    fn from_arg(name: &str, index: usize, val: &Val) -> Result<Self, ErrorKind> {
        match val {
            Val::Float(n) => Ok(*n),
            Val::Int(n) => Ok(*n as f64),
            other => Err(arg_err(name, index, Kind::Float, other)),
        }
    }
}

impl FromValArg for Val {
    fn from_arg(_name: &str, _index: usize, val: &Val) -> Result<Self, ErrorKind> {
        Ok(val.clone())
    }
}

macro_rules! strict_array_arg {
    ($ty:ty, $elem:expr) => {
        impl FromValArg for Vec<$ty> {
            fn from_arg(name: &str, index: usize, val: &Val) -> Result<Self, ErrorKind> {
                match val {
                    Val::Array(arr) if arr.elem() == $elem => {
                        arr.snapshot().iter().map(<$ty>::from_val).collect()
                    }
                    other => Err(arg_err(name, index, Kind::Array($elem), other)),
                }
            }
        }
    };
}

strict_array_arg!(bool, ElemKind::Bool);
strict_array_arg!(i64, ElemKind::Int);
strict_array_arg!(f64, ElemKind::Float);
strict_array_arg!(String, ElemKind::Str);

// ============================================================================
// Typed function results
// ============================================================================

/// What a bound function may return: any directly convertible value,
/// or a `Result` whose error becomes a script-visible host error.
pub trait HostResult {
    fn into_host_result(self) -> Result<Val, ErrorKind>;
}

macro_rules! host_result_via_into {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HostResult for $ty {
                fn into_host_result(self) -> Result<Val, ErrorKind> {
                    Ok(self.into_val())
                }
            }
        )*
    };
}

host_result_via_into!(
    Val,
    (),
    bool,
    i64,
    i32,
    usize,
    f64,
    f32,
    String,
    &str,
    [f64; 2],
    [f64; 3],
    [f64; 4],
    Vec<bool>,
    Vec<i64>,
    Vec<f64>,
    Vec<String>,
);

impl<T: IntoVal> HostResult for Option<T> {
    fn into_host_result(self) -> Result<Val, ErrorKind> {
        Ok(self.into_val())
    }
}

impl<T: IntoVal, E: std::fmt::Display> HostResult for Result<T, E> {
    fn into_host_result(self) -> Result<Val, ErrorKind> {
        match self {
            Ok(v) => Ok(v.into_val()),
            Err(e) => Err(ErrorKind::Host(e.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trips() {
        assert_eq!(to_val(42i64), Val::Int(42));
        assert_eq!(to_val(2.5f64), Val::Float(2.5));
        assert_eq!(to_val(true), Val::Bool(true));
        assert_eq!(to_val("hi"), Val::str("hi"));
        assert_eq!(from_val::<i64>(&Val::Int(42)).unwrap(), 42);
        assert_eq!(from_val::<String>(&Val::str("hi")).unwrap(), "hi");
    }

    #[test]
    fn test_from_val_widens_int() {
        assert_eq!(from_val::<f64>(&Val::Int(3)).unwrap(), 3.0);
    }

    #[test]
    fn test_from_val_rejects_narrowing() {
        assert!(from_val::<i64>(&Val::Float(3.0)).is_err());
        assert!(from_val::<bool>(&Val::Int(1)).is_err());
    }

    #[test]
    fn test_vectors() {
        assert_eq!(to_val([1.0, 2.0]), Val::Float2([1.0, 2.0]));
        assert_eq!(
            from_val::<[f64; 3]>(&Val::Float3([1.0, 2.0, 3.0])).unwrap(),
            [1.0, 2.0, 3.0]
        );
        assert!(from_val::<[f64; 2]>(&Val::Float3([1.0, 2.0, 3.0])).is_err());
    }

    #[test]
    fn test_arrays() {
        let val = to_val(vec![1i64, 2, 3]);
        assert_eq!(val.kind(), Kind::Array(ElemKind::Int));
        assert_eq!(from_val::<Vec<i64>>(&val).unwrap(), vec![1, 2, 3]);
        // Element kind must match.
        assert!(from_val::<Vec<f64>>(&val).is_err());
    }

    #[test]
    fn test_option() {
        assert_eq!(to_val(None::<i64>), Val::Null);
        assert_eq!(to_val(Some(5i64)), Val::Int(5));
        assert_eq!(from_val::<Option<i64>>(&Val::Null).unwrap(), None);
        assert_eq!(from_val::<Option<i64>>(&Val::Int(5)).unwrap(), Some(5));
    }

    #[test]
    fn test_arg_errors_name_position() {
        let err = i64::from_arg("speed", 1, &Val::str("fast")).unwrap_err();
        let ErrorKind::ArgumentTypeMismatch {
            name,
            index,
            expected,
            got,
        } = err
        else {
            panic!("expected argument mismatch");
        };
        assert_eq!(name, "speed");
        assert_eq!(index, 1);
        assert_eq!(expected, Kind::Int);
        assert_eq!(got, Kind::Str);
    }

    #[test]
    fn test_arg_accepts_any_val() {
        assert_eq!(
            Val::from_arg("f", 0, &Val::str("x")).unwrap(),
            Val::str("x")
        );
    }

    #[test]
    fn test_float_arg_widens() {
        assert_eq!(f64::from_arg("f", 0, &Val::Int(2)).unwrap(), 2.0);
        assert!(i64::from_arg("f", 0, &Val::Float(2.0)).is_err());
    }
}
