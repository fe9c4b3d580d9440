// quill-parser - Value types for Quill
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Core value type for Quill.
//!
//! `Val` is the closed tagged union representing every runtime script
//! value. The set of kinds is fixed: bool, int, float, string, the
//! float2/3/4 vectors, and arrays of the scalar kinds. Implicit
//! conversions between kinds go through a dispatch table built once at
//! process start; there is no reflection and no user-extensible kind.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

use im::Vector;

/// Element kind of a script array. Arrays are one-dimensional and hold
/// scalars only; the vector kinds convert to/from `float[]` instead of
/// nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElemKind {
    Bool,
    Int,
    Float,
    Str,
}

impl ElemKind {
    /// The scalar `Kind` of one element.
    pub fn scalar(self) -> Kind {
        match self {
            ElemKind::Bool => Kind::Bool,
            ElemKind::Int => Kind::Int,
            ElemKind::Float => Kind::Float,
            ElemKind::Str => Kind::Str,
        }
    }
}

impl fmt::Display for ElemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scalar())
    }
}

/// Kind discriminant for `Val`. `Null` is the kind of the `null`
/// literal only; no variable can be declared with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Float2,
    Float3,
    Float4,
    Array(ElemKind),
}

impl Kind {
    /// The default value a freshly declared variable of this kind holds.
    pub fn default_val(self) -> Val {
        match self {
            Kind::Null => Val::Null,
            Kind::Bool => Val::Bool(false),
            Kind::Int => Val::Int(0),
            Kind::Float => Val::Float(0.0),
            Kind::Str => Val::str(""),
            Kind::Float2 => Val::Float2([0.0; 2]),
            Kind::Float3 => Val::Float3([0.0; 3]),
            Kind::Float4 => Val::Float4([0.0; 4]),
            Kind::Array(elem) => Val::Array(ArrayVal::new(elem, Vector::new())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Null => write!(f, "null"),
            Kind::Bool => write!(f, "bool"),
            Kind::Int => write!(f, "int"),
            Kind::Float => write!(f, "float"),
            Kind::Str => write!(f, "string"),
            Kind::Float2 => write!(f, "float2"),
            Kind::Float3 => write!(f, "float3"),
            Kind::Float4 => write!(f, "float4"),
            Kind::Array(elem) => write!(f, "{}[]", elem),
        }
    }
}

/// A script array value: element kind plus shared, mutable storage.
///
/// The handle is a reference kind - cloning an `ArrayVal` aliases the
/// same storage, which is what lets indexed assignment mutate an array
/// in place while every other `Val` is replaced wholesale.
#[derive(Debug, Clone)]
pub struct ArrayVal {
    elem: ElemKind,
    items: Rc<RefCell<Vector<Val>>>,
}

impl ArrayVal {
    pub fn new(elem: ElemKind, items: Vector<Val>) -> Self {
        ArrayVal {
            elem,
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn elem(&self) -> ElemKind {
        self.elem
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Val> {
        self.items.borrow().get(index).cloned()
    }

    /// Overwrite one element in place. The caller has already coerced
    /// `val` to the element kind and checked the bounds.
    pub fn set(&self, index: usize, val: Val) {
        self.items.borrow_mut().set(index, val);
    }

    pub fn push(&self, val: Val) {
        self.items.borrow_mut().push_back(val);
    }

    /// Snapshot of the current items (cheap - `im::Vector` shares
    /// structure), used by foreach so iteration survives mutation.
    pub fn snapshot(&self) -> Vector<Val> {
        self.items.borrow().clone()
    }
}

impl PartialEq for ArrayVal {
    fn eq(&self, other: &Self) -> bool {
        self.elem == other.elem && *self.items.borrow() == *other.items.borrow()
    }
}

/// A runtime script value. Exactly one kind is active; primitives are
/// stored inline, strings and arrays behind owned reference handles.
/// Values are immutable once built - assignment replaces the whole
/// value, except for in-place array element mutation via `ArrayVal`.
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Float2([f64; 2]),
    Float3([f64; 3]),
    Float4([f64; 4]),
    Array(ArrayVal),
}

impl Val {
    pub fn str(s: impl Into<Rc<str>>) -> Val {
        Val::Str(s.into())
    }

    /// Build a typed array from already-coerced elements.
    pub fn array(elem: ElemKind, items: impl IntoIterator<Item = Val>) -> Val {
        Val::Array(ArrayVal::new(elem, items.into_iter().collect()))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Val::Null => Kind::Null,
            Val::Bool(_) => Kind::Bool,
            Val::Int(_) => Kind::Int,
            Val::Float(_) => Kind::Float,
            Val::Str(_) => Kind::Str,
            Val::Float2(_) => Kind::Float2,
            Val::Float3(_) => Kind::Float3,
            Val::Float4(_) => Kind::Float4,
            Val::Array(a) => Kind::Array(a.elem()),
        }
    }

    /// Unquoted text form, used by string concatenation and `print`.
    /// Differs from `Display` only for strings, which print without
    /// quotes or escapes here.
    pub fn to_text(&self) -> String {
        match self {
            Val::Str(s) => s.to_string(),
            other => other.to_string(),
        }
    }

    /// Coerce to `target`: exact-kind fast path, then the implicit
    /// conversion table.
    pub fn convert(&self, target: Kind) -> Result<Val, CastError> {
        if self.kind() == target {
            return Ok(self.clone());
        }
        match CONVERSIONS.get(&(self.kind(), target)) {
            Some(conv) => conv(self).ok_or(CastError {
                from: self.kind(),
                to: target,
            }),
            None => Err(CastError {
                from: self.kind(),
                to: target,
            }),
        }
    }
}

/// Canonical float literal formatting: whole floats keep a trailing
/// `.0` so the pretty-printed form re-lexes as a float.
pub fn fmt_float(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}

fn fmt_components(f: &mut fmt::Formatter<'_>, parts: &[f64]) -> fmt::Result {
    write!(f, "(")?;
    for (i, p) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", fmt_float(*p))?;
    }
    write!(f, ")")
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Null => write!(f, "null"),
            Val::Bool(b) => write!(f, "{}", b),
            Val::Int(n) => write!(f, "{}", n),
            Val::Float(n) => write!(f, "{}", fmt_float(*n)),
            Val::Str(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '\\' => write!(f, "\\\\")?,
                        '"' => write!(f, "\\\"")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            Val::Float2(v) => fmt_components(f, v),
            Val::Float3(v) => fmt_components(f, v),
            Val::Float4(v) => fmt_components(f, v),
            Val::Array(a) => {
                write!(f, "[")?;
                for (i, item) in a.snapshot().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// No implicit conversion path between two kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastError {
    pub from: Kind,
    pub to: Kind,
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert {} to {}", self.from, self.to)
    }
}

impl std::error::Error for CastError {}

// ============================================================================
// Implicit conversion table
// ============================================================================

type ConvFn = fn(&Val) -> Option<Val>;

/// The implicit conversion table, keyed (source kind, target kind).
/// Built once at first use and immutable afterwards, so lookups are
/// safe to share across threads. Entries: the numeric widening ladder
/// (int to float), vector/float-array in both directions, and
/// elementwise widening of int arrays.
static CONVERSIONS: LazyLock<HashMap<(Kind, Kind), ConvFn>> = LazyLock::new(|| {
    let mut t: HashMap<(Kind, Kind), ConvFn> = HashMap::new();

    t.insert((Kind::Int, Kind::Float), |v| match v {
        Val::Int(n) => Some(Val::Float(*n as f64)),
        _ => None,
    });

    // A string slot may hold null; comparisons special-case it.
    t.insert((Kind::Null, Kind::Str), |_| Some(Val::Null));

    t.insert((Kind::Float2, Kind::Array(ElemKind::Float)), |v| match v {
        Val::Float2(p) => Some(float_array(p)),
        _ => None,
    });
    t.insert((Kind::Float3, Kind::Array(ElemKind::Float)), |v| match v {
        Val::Float3(p) => Some(float_array(p)),
        _ => None,
    });
    t.insert((Kind::Float4, Kind::Array(ElemKind::Float)), |v| match v {
        Val::Float4(p) => Some(float_array(p)),
        _ => None,
    });

    t.insert((Kind::Array(ElemKind::Float), Kind::Float2), |v| {
        array_to_vector(v, 2).map(|p| Val::Float2([p[0], p[1]]))
    });
    t.insert((Kind::Array(ElemKind::Float), Kind::Float3), |v| {
        array_to_vector(v, 3).map(|p| Val::Float3([p[0], p[1], p[2]]))
    });
    t.insert((Kind::Array(ElemKind::Float), Kind::Float4), |v| {
        array_to_vector(v, 4).map(|p| Val::Float4([p[0], p[1], p[2], p[3]]))
    });

    t.insert(
        (Kind::Array(ElemKind::Int), Kind::Array(ElemKind::Float)),
        |v| match v {
            Val::Array(a) => {
                let mut items = Vector::new();
                for item in a.snapshot() {
                    match item {
                        Val::Int(n) => items.push_back(Val::Float(n as f64)),
                        _ => return None,
                    }
                }
                Some(Val::Array(ArrayVal::new(ElemKind::Float, items)))
            }
            _ => None,
        },
    );

    t
});

fn float_array(parts: &[f64]) -> Val {
    Val::array(ElemKind::Float, parts.iter().map(|p| Val::Float(*p)))
}

/// Length-checked float-array to vector conversion; None if the array
/// does not have exactly `len` float elements.
fn array_to_vector(v: &Val, len: usize) -> Option<Vec<f64>> {
    let Val::Array(a) = v else { return None };
    if a.len() != len {
        return None;
    }
    let mut parts = Vec::with_capacity(len);
    for item in a.snapshot() {
        match item {
            Val::Float(n) => parts.push(n),
            _ => return None,
        }
    }
    Some(parts)
}

// ============================================================================
// Tests
// ============================================================================
