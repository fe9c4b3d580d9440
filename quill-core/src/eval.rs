// quill-core - Statement and expression evaluation
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The evaluator.
//!
//! AST nodes are pure data; this module walks them against the scopes
//! the parser allocated. Statement execution returns a `Flow` so a
//! `return` anywhere in a block unwinds cleanly through every
//! enclosing construct without touching the scope chain.

use std::rc::Rc;

use quill_parser::{Block, ElemKind, Expr, Kind, Pos, Stmt, Val};

use crate::context::Context;
use crate::error::{var_error_kind, Error, ErrorKind, Result, Trace};
use crate::ops;

/// How a statement finished: keep going, or unwind with a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Continue,
    Return(Val),
}

fn trace(source: &Rc<str>, pos: Pos) -> Trace {
    Trace::new(source, pos)
}

/// Execute statements in order. Stops at the first `return` and
/// propagates it.
pub fn run_block(ctx: &Context, source: &Rc<str>, stmts: &[Stmt]) -> Result<Flow> {
    for stmt in stmts {
        if let Flow::Return(val) = exec_stmt(ctx, source, stmt)? {
            return Ok(Flow::Return(val));
        }
    }
    Ok(Flow::Continue)
}

fn run_child(ctx: &Context, source: &Rc<str>, block: &Block) -> Result<Flow> {
    run_block(ctx, source, &block.stmts)
}

/// Evaluate a condition, which must produce a bool.
fn condition(ctx: &Context, source: &Rc<str>, cond: &Expr) -> Result<bool> {
    match eval_expr(ctx, source, cond)? {
        Val::Bool(b) => Ok(b),
        other => Err(Error::eval(
            trace(source, cond.pos()),
            ErrorKind::NonBooleanCondition(other.kind()),
        )),
    }
}

pub fn exec_stmt(ctx: &Context, source: &Rc<str>, stmt: &Stmt) -> Result<Flow> {
    match stmt {
        Stmt::Decl {
            pos,
            scope,
            name,
            kind: _,
            init,
        } => {
            // The slot was reserved at parse time with the kind's
            // default, so a bare declaration has nothing to do at run
            // time. That keeps values the host wrote into the scope
            // before the script ran.
            if let Some(init) = init {
                let val = eval_expr(ctx, source, init)?;
                scope
                    .set(name, val)
                    .map_err(|e| Error::eval(trace(source, *pos), var_error_kind(e)))?;
            }
            Ok(Flow::Continue)
        }
        Stmt::Assign {
            pos,
            scope,
            name,
            index,
            op,
            value,
        } => {
            let err = |e| Error::eval(trace(source, *pos), var_error_kind(e));
            let index = match index {
                Some(expr) => match eval_expr(ctx, source, expr)? {
                    Val::Int(i) => Some(i),
                    other => {
                        return Err(Error::eval(
                            trace(source, expr.pos()),
                            ErrorKind::IncompatibleOperator {
                                op: "[]".to_string(),
                                operands: format!("{} index", other.kind()),
                            },
                        ));
                    }
                },
                None => None,
            };
            let mut val = eval_expr(ctx, source, value)?;
            if let Some(bin) = op.binary() {
                let current = match index {
                    Some(i) => {
                        let target = scope.get(name).map_err(err)?;
                        ops::index(&target, &Val::Int(i))
                            .map_err(|kind| Error::eval(trace(source, *pos), kind))?
                    }
                    None => scope.get(name).map_err(err)?,
                };
                val = ops::binary(bin, &current, &val)
                    .map_err(|kind| Error::eval(trace(source, *pos), kind))?;
            }
            match index {
                Some(i) => scope.set_index(name, i, val).map_err(err)?,
                None => scope.set(name, val).map_err(err)?,
            }
            Ok(Flow::Continue)
        }
        Stmt::Expr { expr, .. } => {
            eval_expr(ctx, source, expr)?;
            Ok(Flow::Continue)
        }
        Stmt::If {
            cond,
            then_block,
            else_block,
            ..
        } => {
            if condition(ctx, source, cond)? {
                run_child(ctx, source, then_block)
            } else if let Some(else_block) = else_block {
                run_child(ctx, source, else_block)
            } else {
                Ok(Flow::Continue)
            }
        }
        Stmt::While { cond, body, .. } => {
            while condition(ctx, source, cond)? {
                if let Flow::Return(val) = run_child(ctx, source, body)? {
                    return Ok(Flow::Return(val));
                }
            }
            Ok(Flow::Continue)
        }
        Stmt::For {
            init,
            cond,
            step,
            body,
            ..
        } => {
            exec_stmt(ctx, source, init)?;
            while condition(ctx, source, cond)? {
                if let Flow::Return(val) = run_block(ctx, source, body)? {
                    return Ok(Flow::Return(val));
                }
                exec_stmt(ctx, source, step)?;
            }
            Ok(Flow::Continue)
        }
        Stmt::Foreach {
            pos,
            var,
            source: items,
            body,
            ..
        } => {
            let seq = eval_expr(ctx, source, items)?;
            // Vectors iterate through their float[] form; everything
            // else must already be an array.
            let arr = match &seq {
                Val::Array(arr) => arr.clone(),
                Val::Float2(_) | Val::Float3(_) | Val::Float4(_) => {
                    let converted = seq
                        .convert(Kind::Array(ElemKind::Float))
                        .map_err(|e| {
                            Error::eval(trace(source, *pos), crate::error::cast_error_kind(e))
                        })?;
                    match converted {
                        Val::Array(arr) => arr,
                        _ => {
                            return Err(Error::eval(
                                trace(source, *pos),
                                ErrorKind::IndexOnNonArray(seq.kind()),
                            ));
                        }
                    }
                }
                other => {
                    return Err(Error::eval(
                        trace(source, *pos),
                        ErrorKind::IndexOnNonArray(other.kind()),
                    ));
                }
            };
            for item in arr.snapshot() {
                body.scope
                    .set(var, item)
                    .map_err(|e| Error::eval(trace(source, *pos), var_error_kind(e)))?;
                if let Flow::Return(val) = run_child(ctx, source, body)? {
                    return Ok(Flow::Return(val));
                }
            }
            Ok(Flow::Continue)
        }
        Stmt::Return { value, .. } => {
            let val = match value {
                Some(expr) => eval_expr(ctx, source, expr)?,
                None => Val::Null,
            };
            Ok(Flow::Return(val))
        }
    }
}

pub fn eval_expr(ctx: &Context, source: &Rc<str>, expr: &Expr) -> Result<Val> {
    match expr {
        Expr::Literal { val, .. } => Ok(val.clone()),
        Expr::Var { pos, scope, name } => scope
            .get(name)
            .map_err(|e| Error::eval(trace(source, *pos), var_error_kind(e))),
        Expr::Unary { pos, op, operand } => {
            let operand = eval_expr(ctx, source, operand)?;
            ops::unary(*op, &operand).map_err(|kind| Error::eval(trace(source, *pos), kind))
        }
        Expr::Binary {
            pos,
            op,
            left,
            right,
        } => {
            let left = eval_expr(ctx, source, left)?;
            let right = eval_expr(ctx, source, right)?;
            ops::binary(*op, &left, &right)
                .map_err(|kind| Error::eval(trace(source, *pos), kind))
        }
        Expr::Index { pos, target, index } => {
            let target = eval_expr(ctx, source, target)?;
            let index = eval_expr(ctx, source, index)?;
            ops::index(&target, &index).map_err(|kind| Error::eval(trace(source, *pos), kind))
        }
        Expr::Call { pos, name, args } => {
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(eval_expr(ctx, source, arg)?);
            }
            ctx.run_function(&trace(source, *pos), name, &evaluated)
        }
        Expr::Vector { pos: _, parts } => {
            let mut components = [0.0; 4];
            for (i, part) in parts.iter().enumerate() {
                let val = eval_expr(ctx, source, part)?;
                match val.convert(Kind::Float) {
                    Ok(Val::Float(n)) => components[i] = n,
                    _ => {
                        return Err(Error::eval(
                            trace(source, part.pos()),
                            ErrorKind::InvalidCast {
                                from: val.kind(),
                                to: Kind::Float,
                            },
                        ));
                    }
                }
            }
            match parts.len() {
                2 => Ok(Val::Float2([components[0], components[1]])),
                3 => Ok(Val::Float3([components[0], components[1], components[2]])),
                _ => Ok(Val::Float4(components)),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quill_parser::Scope;

    fn run(src: &str) -> Result<Val> {
        let ctx = Context::new();
        let mut script = crate::script::Script::new("test", Scope::new());
        script.add_statements(src)?;
        script.run(&ctx)
    }

    fn run_val(src: &str) -> Val {
        run(src).unwrap()
    }

    fn run_kind(src: &str) -> ErrorKind {
        match run(src).unwrap_err() {
            Error::Eval(e) => e.kind,
            other => panic!("expected eval error, got {}", other),
        }
    }

    #[test]
    fn test_arithmetic_with_promotion() {
        assert_eq!(run_val("int a = 7; int b = 2; return a / b;"), Val::Int(3));
        assert_eq!(run_val("return 1 + 2.5;"), Val::Float(3.5));
        assert_eq!(run_val("float f = 3; return f;"), Val::Float(3.0));
    }

    #[test]
    fn test_vector_component_read() {
        assert_eq!(run_val("float2 v = (1, 2); return v[1];"), Val::Float(2.0));
    }

    #[test]
    fn test_if_else_branches() {
        let src = "int x = 5;
                   if (x > 3) { return 1; } else { return 2; }";
        assert_eq!(run_val(src), Val::Int(1));
        let src = "int x = 1;
                   if (x > 3) { return 1; } else if (x > 0) { return 2; } else { return 3; }";
        assert_eq!(run_val(src), Val::Int(2));
    }

    #[test]
    fn test_while_loop() {
        let src = "int n = 0;
                   int total = 0;
                   while (n < 5) { total += n; n += 1; }
                   return total;";
        assert_eq!(run_val(src), Val::Int(10));
    }

    #[test]
    fn test_for_loop() {
        let src = "int total = 0;
                   for (int i = 1; i <= 4; i += 1) { total += i; }
                   return total;";
        assert_eq!(run_val(src), Val::Int(10));
    }

    #[test]
    fn test_return_stops_siblings() {
        let src = "int x = 1;
                   if (true) { return x; }
                   x = 99;
                   return x;";
        assert_eq!(run_val(src), Val::Int(1));
    }

    #[test]
    fn test_return_unwinds_nested_loops() {
        let src = "for (int i = 0; i < 10; i += 1) {
                       while (true) { return i + 100; }
                   }
                   return -1;";
        assert_eq!(run_val(src), Val::Int(100));
    }

    #[test]
    fn test_declaration_resets_each_iteration() {
        let src = "int total = 0;
                   for (int i = 0; i < 3; i += 1) {
                       int x = 0;
                       x += 1;
                       total += x;
                   }
                   return total;";
        // x restarts at its initializer every pass even though the
        // body scope is allocated once.
        assert_eq!(run_val(src), Val::Int(3));
    }

    #[test]
    fn test_non_boolean_condition() {
        assert!(matches!(
            run_kind("if (1) { }"),
            ErrorKind::NonBooleanCondition(Kind::Int)
        ));
        assert!(matches!(
            run_kind("while (\"x\") { }"),
            ErrorKind::NonBooleanCondition(Kind::Str)
        ));
    }

    #[test]
    fn test_variable_not_found() {
        assert!(matches!(
            run_kind("return missing;"),
            ErrorKind::VariableNotFound(name) if name == "missing"
        ));
    }

    #[test]
    fn test_function_not_found() {
        assert!(matches!(
            run_kind("frobnicate();"),
            ErrorKind::FunctionNotFound(name) if name == "frobnicate"
        ));
    }

    #[test]
    fn test_division_by_zero_traced() {
        let err = run("int a = 1;\nreturn a / 0;").unwrap_err();
        let Error::Eval(e) = err else {
            panic!("expected eval error");
        };
        assert!(matches!(e.kind, ErrorKind::DivisionByZero));
        assert_eq!(e.trace.line, 2);
    }

    #[test]
    fn test_compound_indexed_assignment() {
        let src = "float3 v = (1, 2, 3);
                   v[0] += 10;
                   return v[0];";
        assert_eq!(run_val(src), Val::Float(11.0));
    }

    #[test]
    fn test_foreach_over_array() {
        let ctx = Context::new();
        let scope = Scope::new();
        let mut script = crate::script::Script::new("test", scope.clone());
        script
            .add_statements(
                "int[] xs;
                 int total = 0;
                 foreach (int x in xs) { total += x; }
                 return total;",
            )
            .unwrap();
        scope
            .set(
                "xs",
                Val::array(
                    ElemKind::Int,
                    vec![Val::Int(1), Val::Int(2), Val::Int(3)],
                ),
            )
            .unwrap();
        assert_eq!(script.run(&ctx).unwrap(), Val::Int(6));
    }

    #[test]
    fn test_foreach_over_vector() {
        let src = "float3 v = (1, 2, 3);
                   float total = 0.0;
                   foreach (float c in v) { total += c; }
                   return total;";
        assert_eq!(run_val(src), Val::Float(6.0));
    }

    #[test]
    fn test_foreach_coerces_loop_var() {
        let src = "float3 v = (1, 2, 3);
                   string out = \"\";
                   foreach (float c in v) { out += \"\" + c; }
                   return out;";
        assert_eq!(run_val(src), Val::str("1.02.03.0"));
    }

    #[test]
    fn test_shadowing_restores_outer() {
        let src = "int x = 1;
                   if (true) { int x = 2; x = 3; }
                   return x;";
        assert_eq!(run_val(src), Val::Int(1));
    }

    #[test]
    fn test_assignment_writes_through_to_outer() {
        let src = "int x = 1;
                   if (true) { x = 42; }
                   return x;";
        assert_eq!(run_val(src), Val::Int(42));
    }

    #[test]
    fn test_string_building() {
        let src = "string s = \"n=\";
                   s += 4;
                   s = s + \"!\";
                   return s;";
        assert_eq!(run_val(src), Val::str("n=4!"));
    }

    #[test]
    fn test_logical_compound_assign() {
        let src = "bool b = true;
                   b &= false;
                   b |= true;
                   return b;";
        assert_eq!(run_val(src), Val::Bool(true));
    }

    #[test]
    fn test_vector_constructor_coerces_ints() {
        assert_eq!(
            run_val("float2 v = (1, 2); return v;"),
            Val::Float2([1.0, 2.0])
        );
    }

    #[test]
    fn test_index_out_of_range_reports_length() {
        assert!(matches!(
            run_kind("float3 v; return v[3];"),
            ErrorKind::IndexOutOfRange { index: 3, length: 3 }
        ));
    }
}
