// quill-core - Operator engine for the Quill evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Table-driven operator dispatch.
//!
//! Unary operators are keyed by (operator, operand kind) and binary
//! operators by (operator, left kind, right kind); the tables are
//! built once and shared read-only. Dispatch falls back in two steps:
//! int operands are widened to float and the lookup retried, then
//! equality gets a structural fallback so `==`/`!=` are total over
//! matching kinds. Anything still unmatched is an incompatible
//! operator error naming the operand kinds.

use std::collections::HashMap;
use std::sync::LazyLock;

use quill_parser::{BinOp, Kind, UnOp, Val};

use crate::error::ErrorKind;

type OpResult = std::result::Result<Val, ErrorKind>;
type BinFn = fn(&Val, &Val) -> OpResult;
type UnFn = fn(&Val) -> OpResult;

fn incompatible_bin(op: BinOp, left: &Val, right: &Val) -> ErrorKind {
    ErrorKind::IncompatibleOperator {
        op: op.to_string(),
        operands: format!("{} and {}", left.kind(), right.kind()),
    }
}

fn incompatible_un(op: UnOp, operand: &Val) -> ErrorKind {
    ErrorKind::IncompatibleOperator {
        op: op.to_string(),
        operands: operand.kind().to_string(),
    }
}

/// Register one binary handler. The guard arm never fires when the
/// table key matches the operand kinds; it keeps the closure total.
macro_rules! binop {
    ($m:expr, $op:expr, $lk:expr, $rk:expr, ($lp:pat, $rp:pat) => $body:expr) => {
        $m.insert(
            ($op, $lk, $rk),
            (|l: &Val, r: &Val| match (l, r) {
                ($lp, $rp) => $body,
                _ => Err(incompatible_bin($op, l, r)),
            }) as BinFn,
        );
    };
}

macro_rules! unop {
    ($m:expr, $op:expr, $k:expr, $p:pat => $body:expr) => {
        $m.insert(
            ($op, $k),
            (|v: &Val| match v {
                $p => $body,
                _ => Err(incompatible_un($op, v)),
            }) as UnFn,
        );
    };
}

/// Componentwise vector arithmetic for one vector width: vector with
/// vector for `+ - * /`, vector with float scalar for `* /`, and
/// float scalar times vector.
macro_rules! vec_ops {
    ($m:expr, $kind:ident, $variant:ident) => {
        binop!($m, BinOp::Add, Kind::$kind, Kind::$kind, (Val::$variant(a), Val::$variant(b)) => {
            let mut out = *a;
            for (o, b) in out.iter_mut().zip(b.iter()) {
                *o += b;
            }
            Ok(Val::$variant(out))
        });
        binop!($m, BinOp::Sub, Kind::$kind, Kind::$kind, (Val::$variant(a), Val::$variant(b)) => {
            let mut out = *a;
            for (o, b) in out.iter_mut().zip(b.iter()) {
                *o -= b;
            }
            Ok(Val::$variant(out))
        });
        binop!($m, BinOp::Mul, Kind::$kind, Kind::$kind, (Val::$variant(a), Val::$variant(b)) => {
            let mut out = *a;
            for (o, b) in out.iter_mut().zip(b.iter()) {
                *o *= b;
            }
            Ok(Val::$variant(out))
        });
        binop!($m, BinOp::Div, Kind::$kind, Kind::$kind, (Val::$variant(a), Val::$variant(b)) => {
            let mut out = *a;
            for (o, b) in out.iter_mut().zip(b.iter()) {
                *o /= b;
            }
            Ok(Val::$variant(out))
        });
        binop!($m, BinOp::Mul, Kind::$kind, Kind::Float, (Val::$variant(a), Val::Float(s)) => {
            let mut out = *a;
            for o in out.iter_mut() {
                *o *= s;
            }
            Ok(Val::$variant(out))
        });
        binop!($m, BinOp::Mul, Kind::Float, Kind::$kind, (Val::Float(s), Val::$variant(a)) => {
            let mut out = *a;
            for o in out.iter_mut() {
                *o *= s;
            }
            Ok(Val::$variant(out))
        });
        binop!($m, BinOp::Div, Kind::$kind, Kind::Float, (Val::$variant(a), Val::Float(s)) => {
            let mut out = *a;
            for o in out.iter_mut() {
                *o /= s;
            }
            Ok(Val::$variant(out))
        });
    };
}

static BINARY: LazyLock<HashMap<(BinOp, Kind, Kind), BinFn>> = LazyLock::new(|| {
    let mut m: HashMap<(BinOp, Kind, Kind), BinFn> = HashMap::new();

    // Integer arithmetic. Division and modulo truncate toward zero
    // and reject a zero divisor.
    binop!(m, BinOp::Add, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => Ok(Val::Int(a.wrapping_add(*b))));
    binop!(m, BinOp::Sub, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => Ok(Val::Int(a.wrapping_sub(*b))));
    binop!(m, BinOp::Mul, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => Ok(Val::Int(a.wrapping_mul(*b))));
    binop!(m, BinOp::Div, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => {
        if *b == 0 {
            Err(ErrorKind::DivisionByZero)
        } else {
            Ok(Val::Int(a.wrapping_div(*b)))
        }
    });
    binop!(m, BinOp::Mod, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => {
        if *b == 0 {
            Err(ErrorKind::DivisionByZero)
        } else {
            Ok(Val::Int(a.wrapping_rem(*b)))
        }
    });

    // Float arithmetic follows IEEE 754; division by zero yields an
    // infinity rather than an error.
    binop!(m, BinOp::Add, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Float(a + b)));
    binop!(m, BinOp::Sub, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Float(a - b)));
    binop!(m, BinOp::Mul, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Float(a * b)));
    binop!(m, BinOp::Div, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Float(a / b)));
    binop!(m, BinOp::Mod, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Float(a % b)));

    // Relational and equality over the numeric scalars.
    binop!(m, BinOp::Lt, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => Ok(Val::Bool(a < b)));
    binop!(m, BinOp::Le, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => Ok(Val::Bool(a <= b)));
    binop!(m, BinOp::Gt, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => Ok(Val::Bool(a > b)));
    binop!(m, BinOp::Ge, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => Ok(Val::Bool(a >= b)));
    binop!(m, BinOp::Eq, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => Ok(Val::Bool(a == b)));
    binop!(m, BinOp::Ne, Kind::Int, Kind::Int, (Val::Int(a), Val::Int(b)) => Ok(Val::Bool(a != b)));
    binop!(m, BinOp::Lt, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Bool(a < b)));
    binop!(m, BinOp::Le, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Bool(a <= b)));
    binop!(m, BinOp::Gt, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Bool(a > b)));
    binop!(m, BinOp::Ge, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Bool(a >= b)));
    binop!(m, BinOp::Eq, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Bool(a == b)));
    binop!(m, BinOp::Ne, Kind::Float, Kind::Float, (Val::Float(a), Val::Float(b)) => Ok(Val::Bool(a != b)));

    // Boolean logic. Both operands are already evaluated; there is no
    // short-circuiting in the language.
    binop!(m, BinOp::And, Kind::Bool, Kind::Bool, (Val::Bool(a), Val::Bool(b)) => Ok(Val::Bool(*a && *b)));
    binop!(m, BinOp::Or, Kind::Bool, Kind::Bool, (Val::Bool(a), Val::Bool(b)) => Ok(Val::Bool(*a || *b)));

    // String concatenation, with numbers rendered on either side.
    binop!(m, BinOp::Add, Kind::Str, Kind::Str, (Val::Str(a), Val::Str(b)) => Ok(Val::str(format!("{}{}", a, b))));
    binop!(m, BinOp::Add, Kind::Str, Kind::Int, (Val::Str(a), b) => Ok(Val::str(format!("{}{}", a, b.to_text()))));
    binop!(m, BinOp::Add, Kind::Str, Kind::Float, (Val::Str(a), b) => Ok(Val::str(format!("{}{}", a, b.to_text()))));
    binop!(m, BinOp::Add, Kind::Str, Kind::Bool, (Val::Str(a), b) => Ok(Val::str(format!("{}{}", a, b.to_text()))));
    binop!(m, BinOp::Add, Kind::Int, Kind::Str, (a, Val::Str(b)) => Ok(Val::str(format!("{}{}", a.to_text(), b))));
    binop!(m, BinOp::Add, Kind::Float, Kind::Str, (a, Val::Str(b)) => Ok(Val::str(format!("{}{}", a.to_text(), b))));
    binop!(m, BinOp::Add, Kind::Bool, Kind::Str, (a, Val::Str(b)) => Ok(Val::str(format!("{}{}", a.to_text(), b))));

    vec_ops!(m, Float2, Float2);
    vec_ops!(m, Float3, Float3);
    vec_ops!(m, Float4, Float4);

    m
});

static UNARY: LazyLock<HashMap<(UnOp, Kind), UnFn>> = LazyLock::new(|| {
    let mut m: HashMap<(UnOp, Kind), UnFn> = HashMap::new();
    unop!(m, UnOp::Neg, Kind::Int, Val::Int(n) => Ok(Val::Int(n.wrapping_neg())));
    unop!(m, UnOp::Neg, Kind::Float, Val::Float(n) => Ok(Val::Float(-n)));
    unop!(m, UnOp::Not, Kind::Bool, Val::Bool(b) => Ok(Val::Bool(!b)));
    unop!(m, UnOp::Neg, Kind::Float2, Val::Float2(a) => Ok(Val::Float2([-a[0], -a[1]])));
    unop!(m, UnOp::Neg, Kind::Float3, Val::Float3(a) => Ok(Val::Float3([-a[0], -a[1], -a[2]])));
    unop!(m, UnOp::Neg, Kind::Float4, Val::Float4(a) => Ok(Val::Float4([-a[0], -a[1], -a[2], -a[3]])));
    m
});

/// Widen an int operand to float so mixed numeric expressions resolve
/// against the float tables.
fn widen(val: &Val) -> Option<Val> {
    match val {
        Val::Int(n) => Some(Val::Float(*n as f64)),
        _ => None,
    }
}

/// Apply a binary operator.
pub fn binary(op: BinOp, left: &Val, right: &Val) -> OpResult {
    let lk = left.kind();
    let rk = right.kind();
    if let Some(f) = BINARY.get(&(op, lk, rk)) {
        return f(left, right);
    }

    // Int widening: promote whichever side is int and retry. This
    // covers int-with-float and int-with-vector combinations.
    if lk != rk {
        if let Some(wl) = widen(left) {
            if let Some(f) = BINARY.get(&(op, Kind::Float, rk)) {
                return f(&wl, right);
            }
        }
        if let Some(wr) = widen(right) {
            if let Some(f) = BINARY.get(&(op, lk, Kind::Float)) {
                return f(left, &wr);
            }
        }
    }

    // Equality is total: matching kinds compare structurally, a null
    // never equals a non-null, and remaining kind mismatches are
    // simply unequal.
    match op {
        BinOp::Eq if lk == rk => Ok(Val::Bool(left == right)),
        BinOp::Ne if lk == rk => Ok(Val::Bool(left != right)),
        BinOp::Eq => Ok(Val::Bool(false)),
        BinOp::Ne => Ok(Val::Bool(true)),
        _ => Err(incompatible_bin(op, left, right)),
    }
}

/// Apply a unary operator.
pub fn unary(op: UnOp, operand: &Val) -> OpResult {
    match UNARY.get(&(op, operand.kind())) {
        Some(f) => f(operand),
        None => Err(incompatible_un(op, operand)),
    }
}

/// Index a value: one component of a vector, or a bounds-checked
/// array element.
pub fn index(target: &Val, index: &Val) -> OpResult {
    let Val::Int(i) = index else {
        return Err(ErrorKind::IncompatibleOperator {
            op: "[]".to_string(),
            operands: format!("{} index", index.kind()),
        });
    };
    let component = |parts: &[f64]| -> OpResult {
        if *i < 0 || *i as usize >= parts.len() {
            return Err(ErrorKind::IndexOutOfRange {
                index: *i,
                length: parts.len(),
            });
        }
        Ok(Val::Float(parts[*i as usize]))
    };
    match target {
        Val::Float2(parts) => component(parts),
        Val::Float3(parts) => component(parts),
        Val::Float4(parts) => component(parts),
        Val::Array(arr) => match arr.get(*i as usize) {
            Some(val) if *i >= 0 => Ok(val),
            _ => Err(ErrorKind::IndexOutOfRange {
                index: *i,
                length: arr.len(),
            }),
        },
        other => Err(ErrorKind::IndexOnNonArray(other.kind())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quill_parser::ElemKind;

    #[test]
    fn test_int_arithmetic() {
        assert_eq!(
            binary(BinOp::Add, &Val::Int(2), &Val::Int(3)).unwrap(),
            Val::Int(5)
        );
        // Integer division truncates toward zero.
        assert_eq!(
            binary(BinOp::Div, &Val::Int(7), &Val::Int(2)).unwrap(),
            Val::Int(3)
        );
        assert_eq!(
            binary(BinOp::Div, &Val::Int(-7), &Val::Int(2)).unwrap(),
            Val::Int(-3)
        );
        assert_eq!(
            binary(BinOp::Mod, &Val::Int(7), &Val::Int(4)).unwrap(),
            Val::Int(3)
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            binary(BinOp::Div, &Val::Int(1), &Val::Int(0)),
            Err(ErrorKind::DivisionByZero)
        ));
        assert!(matches!(
            binary(BinOp::Mod, &Val::Int(1), &Val::Int(0)),
            Err(ErrorKind::DivisionByZero)
        ));
        // Float division by zero follows IEEE instead.
        assert_eq!(
            binary(BinOp::Div, &Val::Float(1.0), &Val::Float(0.0)).unwrap(),
            Val::Float(f64::INFINITY)
        );
    }

    #[test]
    fn test_int_float_promotion() {
        assert_eq!(
            binary(BinOp::Add, &Val::Int(1), &Val::Float(2.5)).unwrap(),
            Val::Float(3.5)
        );
        assert_eq!(
            binary(BinOp::Mul, &Val::Float(2.0), &Val::Int(3)).unwrap(),
            Val::Float(6.0)
        );
        assert_eq!(
            binary(BinOp::Lt, &Val::Int(1), &Val::Float(1.5)).unwrap(),
            Val::Bool(true)
        );
    }

    #[test]
    fn test_string_concat() {
        assert_eq!(
            binary(BinOp::Add, &Val::str("a"), &Val::str("b")).unwrap(),
            Val::str("ab")
        );
        assert_eq!(
            binary(BinOp::Add, &Val::str("n = "), &Val::Int(4)).unwrap(),
            Val::str("n = 4")
        );
        assert_eq!(
            binary(BinOp::Add, &Val::Float(1.5), &Val::str("!")).unwrap(),
            Val::str("1.5!")
        );
        assert_eq!(
            binary(BinOp::Add, &Val::str("ok: "), &Val::Bool(true)).unwrap(),
            Val::str("ok: true")
        );
        assert_eq!(
            binary(BinOp::Add, &Val::Bool(false), &Val::str("!")).unwrap(),
            Val::str("false!")
        );
    }

    #[test]
    fn test_vector_arithmetic() {
        let a = Val::Float2([1.0, 2.0]);
        let b = Val::Float2([3.0, 5.0]);
        assert_eq!(
            binary(BinOp::Add, &a, &b).unwrap(),
            Val::Float2([4.0, 7.0])
        );
        assert_eq!(
            binary(BinOp::Sub, &b, &a).unwrap(),
            Val::Float2([2.0, 3.0])
        );
        assert_eq!(
            binary(BinOp::Mul, &a, &b).unwrap(),
            Val::Float2([3.0, 10.0])
        );
    }

    #[test]
    fn test_vector_scalar() {
        let v = Val::Float3([1.0, 2.0, 3.0]);
        assert_eq!(
            binary(BinOp::Mul, &v, &Val::Float(2.0)).unwrap(),
            Val::Float3([2.0, 4.0, 6.0])
        );
        assert_eq!(
            binary(BinOp::Mul, &Val::Float(2.0), &v).unwrap(),
            Val::Float3([2.0, 4.0, 6.0])
        );
        // Int scalars widen before the vector lookup.
        assert_eq!(
            binary(BinOp::Mul, &v, &Val::Int(2)).unwrap(),
            Val::Float3([2.0, 4.0, 6.0])
        );
        assert_eq!(
            binary(BinOp::Div, &v, &Val::Float(2.0)).unwrap(),
            Val::Float3([0.5, 1.0, 1.5])
        );
    }

    #[test]
    fn test_logic() {
        assert_eq!(
            binary(BinOp::And, &Val::Bool(true), &Val::Bool(false)).unwrap(),
            Val::Bool(false)
        );
        assert_eq!(
            binary(BinOp::Or, &Val::Bool(true), &Val::Bool(false)).unwrap(),
            Val::Bool(true)
        );
        assert_eq!(unary(UnOp::Not, &Val::Bool(true)).unwrap(), Val::Bool(false));
    }

    #[test]
    fn test_negation() {
        assert_eq!(unary(UnOp::Neg, &Val::Int(5)).unwrap(), Val::Int(-5));
        assert_eq!(
            unary(UnOp::Neg, &Val::Float2([1.0, -2.0])).unwrap(),
            Val::Float2([-1.0, 2.0])
        );
        assert_eq!(
            unary(UnOp::Neg, &Val::Float3([1.0, -2.0, 3.0])).unwrap(),
            Val::Float3([-1.0, 2.0, -3.0])
        );
        assert_eq!(
            unary(UnOp::Neg, &Val::Float4([1.0, 2.0, 3.0, 4.0])).unwrap(),
            Val::Float4([-1.0, -2.0, -3.0, -4.0])
        );
    }

    #[test]
    fn test_equality_fallback() {
        // Matching kinds compare structurally even without a table
        // entry.
        assert_eq!(
            binary(BinOp::Eq, &Val::str("x"), &Val::str("x")).unwrap(),
            Val::Bool(true)
        );
        assert_eq!(
            binary(
                BinOp::Eq,
                &Val::Float2([1.0, 2.0]),
                &Val::Float2([1.0, 2.0])
            )
            .unwrap(),
            Val::Bool(true)
        );
        // Null never equals a string value.
        assert_eq!(
            binary(BinOp::Eq, &Val::Null, &Val::str("x")).unwrap(),
            Val::Bool(false)
        );
        assert_eq!(
            binary(BinOp::Ne, &Val::Null, &Val::str("x")).unwrap(),
            Val::Bool(true)
        );
        assert_eq!(
            binary(BinOp::Eq, &Val::Null, &Val::Null).unwrap(),
            Val::Bool(true)
        );
    }

    #[test]
    fn test_incompatible_operator() {
        let err = binary(BinOp::Sub, &Val::str("a"), &Val::str("b")).unwrap_err();
        let ErrorKind::IncompatibleOperator { op, operands } = err else {
            panic!("expected incompatible operator");
        };
        assert_eq!(op, "-");
        assert_eq!(operands, "string and string");
    }

    #[test]
    fn test_index_vector_component() {
        let v = Val::Float3([1.0, 2.0, 3.0]);
        assert_eq!(index(&v, &Val::Int(1)).unwrap(), Val::Float(2.0));
        assert!(matches!(
            index(&v, &Val::Int(3)),
            Err(ErrorKind::IndexOutOfRange { index: 3, length: 3 })
        ));
    }

    #[test]
    fn test_index_array_bounds() {
        let arr = Val::array(ElemKind::Int, vec![Val::Int(10), Val::Int(20)]);
        assert_eq!(index(&arr, &Val::Int(0)).unwrap(), Val::Int(10));
        assert!(matches!(
            index(&arr, &Val::Int(5)),
            Err(ErrorKind::IndexOutOfRange { index: 5, length: 2 })
        ));
        assert!(matches!(
            index(&arr, &Val::Int(-1)),
            Err(ErrorKind::IndexOutOfRange { index: -1, .. })
        ));
    }

    #[test]
    fn test_index_non_array() {
        assert!(matches!(
            index(&Val::Int(3), &Val::Int(0)),
            Err(ErrorKind::IndexOnNonArray(Kind::Int))
        ));
    }
}
