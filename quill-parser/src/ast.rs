// quill-parser - AST for Quill
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Syntax tree produced by the parser.
//!
//! Nodes are pure data: evaluation lives in `quill-core`. Every node
//! carries the source position it was parsed at so runtime errors can
//! point back into the script, and `Block`s carry the scope allocated
//! for them at parse time.

use std::fmt;

use crate::scope::Scope;
use crate::value::{Kind, Val};

/// Source position of a node (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

/// Assignment operators, `x = v` through `x |= v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
}

impl AssignOp {
    /// The binary operator a compound assignment expands to, if any.
    pub fn binary(self) -> Option<BinOp> {
        match self {
            AssignOp::Set => None,
            AssignOp::Add => Some(BinOp::Add),
            AssignOp::Sub => Some(BinOp::Sub),
            AssignOp::Mul => Some(BinOp::Mul),
            AssignOp::Div => Some(BinOp::Div),
            AssignOp::Mod => Some(BinOp::Mod),
            AssignOp::And => Some(BinOp::And),
            AssignOp::Or => Some(BinOp::Or),
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
        };
        write!(f, "{}", text)
    }
}

/// Binary operators in increasing precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        };
        write!(f, "{}", text)
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Neg,
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "!"),
        }
    }
}

/// An expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        pos: Pos,
        val: Val,
    },
    /// Variable read; the scope it resolves through was captured at
    /// parse time.
    Var {
        pos: Pos,
        scope: Scope,
        name: String,
    },
    Unary {
        pos: Pos,
        op: UnOp,
        operand: Box<Expr>,
    },
    Binary {
        pos: Pos,
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Index {
        pos: Pos,
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        pos: Pos,
        name: String,
        args: Vec<Expr>,
    },
    /// Vector constructor `(x, y)` .. `(x, y, z, w)`; 2 to 4 parts.
    Vector {
        pos: Pos,
        parts: Vec<Expr>,
    },
}

impl Expr {
    pub fn pos(&self) -> Pos {
        match self {
            Expr::Literal { pos, .. }
            | Expr::Var { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Binary { pos, .. }
            | Expr::Index { pos, .. }
            | Expr::Call { pos, .. }
            | Expr::Vector { pos, .. } => *pos,
        }
    }
}

/// A statement node.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Variable declaration; the slot itself was created at parse
    /// time, the initializer (if any) runs at execution.
    Decl {
        pos: Pos,
        scope: Scope,
        name: String,
        kind: Kind,
        init: Option<Expr>,
    },
    Assign {
        pos: Pos,
        scope: Scope,
        name: String,
        index: Option<Expr>,
        op: AssignOp,
        value: Expr,
    },
    /// Bare expression statement (in practice a call).
    Expr { pos: Pos, expr: Expr },
    If {
        pos: Pos,
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        pos: Pos,
        cond: Expr,
        body: Block,
    },
    For {
        pos: Pos,
        /// The init, cond, step and body all share the loop scope.
        scope: Scope,
        init: Box<Stmt>,
        cond: Expr,
        step: Box<Stmt>,
        body: Vec<Stmt>,
    },
    Foreach {
        pos: Pos,
        /// Loop variable, declared in the body block's scope.
        var: String,
        kind: Kind,
        source: Expr,
        body: Block,
    },
    Return { pos: Pos, value: Option<Expr> },
}

impl Stmt {
    pub fn pos(&self) -> Pos {
        match self {
            Stmt::Decl { pos, .. }
            | Stmt::Assign { pos, .. }
            | Stmt::Expr { pos, .. }
            | Stmt::If { pos, .. }
            | Stmt::While { pos, .. }
            | Stmt::For { pos, .. }
            | Stmt::Foreach { pos, .. }
            | Stmt::Return { pos, .. } => *pos,
        }
    }
}

/// A braced statement list with the scope allocated for it.
#[derive(Debug, Clone)]
pub struct Block {
    pub scope: Scope,
    pub stmts: Vec<Stmt>,
}

// ============================================================================
// Canonical source output
// ============================================================================

/// Write statements back out as canonical source, one per line,
/// indented `depth` levels.
pub fn write_stmts(out: &mut String, stmts: &[Stmt], depth: usize) {
    for stmt in stmts {
        write_stmt(out, stmt, depth);
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("    ");
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    indent(out, depth);
    match stmt {
        Stmt::Decl {
            name, kind, init, ..
        } => {
            out.push_str(&format!("{} {}", kind, name));
            if let Some(init) = init {
                out.push_str(" = ");
                write_expr(out, init, false);
            }
            out.push_str(";\n");
        }
        Stmt::Assign {
            name,
            index,
            op,
            value,
            ..
        } => {
            out.push_str(name);
            if let Some(index) = index {
                out.push('[');
                write_expr(out, index, false);
                out.push(']');
            }
            out.push_str(&format!(" {} ", op));
            write_expr(out, value, false);
            out.push_str(";\n");
        }
        Stmt::Expr { expr, .. } => {
            write_expr(out, expr, false);
            out.push_str(";\n");
        }
        Stmt::If {
            cond,
            then_block,
            else_block,
            ..
        } => {
            out.push_str("if (");
            write_expr(out, cond, false);
            out.push_str(") {\n");
            write_stmts(out, &then_block.stmts, depth + 1);
            indent(out, depth);
            out.push('}');
            if let Some(else_block) = else_block {
                // Re-fold `else { if ... }` back into `else if`.
                if let [Stmt::If { .. }] = else_block.stmts.as_slice() {
                    out.push_str(" else ");
                    let mut nested = String::new();
                    write_stmt(&mut nested, &else_block.stmts[0], depth);
                    out.push_str(nested.trim_start());
                    return;
                }
                out.push_str(" else {\n");
                write_stmts(out, &else_block.stmts, depth + 1);
                indent(out, depth);
                out.push('}');
            }
            out.push('\n');
        }
        Stmt::While { cond, body, .. } => {
            out.push_str("while (");
            write_expr(out, cond, false);
            out.push_str(") {\n");
            write_stmts(out, &body.stmts, depth + 1);
            indent(out, depth);
            out.push_str("}\n");
        }
        Stmt::For {
            init,
            cond,
            step,
            body,
            ..
        } => {
            out.push_str("for (");
            let mut clause = String::new();
            write_stmt(&mut clause, init, 0);
            out.push_str(clause.trim_end_matches('\n'));
            out.push(' ');
            write_expr(out, cond, false);
            out.push_str("; ");
            let mut clause = String::new();
            write_stmt(&mut clause, step, 0);
            out.push_str(clause.trim_end_matches(";\n"));
            out.push_str(") {\n");
            write_stmts(out, body, depth + 1);
            indent(out, depth);
            out.push_str("}\n");
        }
        Stmt::Foreach {
            var,
            kind,
            source,
            body,
            ..
        } => {
            out.push_str(&format!("foreach ({} {} in ", kind, var));
            write_expr(out, source, false);
            out.push_str(") {\n");
            write_stmts(out, &body.stmts, depth + 1);
            indent(out, depth);
            out.push_str("}\n");
        }
        Stmt::Return { value, .. } => {
            out.push_str("return");
            if let Some(value) = value {
                out.push(' ');
                write_expr(out, value, false);
            }
            out.push_str(";\n");
        }
    }
}

/// Write an expression. `nested` is true when this is an operand of an
/// enclosing binary operator, which forces parentheses around binary
/// sub-expressions so precedence survives a reparse.
fn write_expr(out: &mut String, expr: &Expr, nested: bool) {
    match expr {
        Expr::Literal { val, .. } => out.push_str(&val.to_string()),
        Expr::Var { name, .. } => out.push_str(name),
        Expr::Unary { op, operand, .. } => {
            out.push_str(&op.to_string());
            write_expr(out, operand, true);
        }
        Expr::Binary {
            op, left, right, ..
        } => {
            if nested {
                out.push('(');
            }
            write_expr(out, left, true);
            out.push_str(&format!(" {} ", op));
            write_expr(out, right, true);
            if nested {
                out.push(')');
            }
        }
        Expr::Index { target, index, .. } => {
            write_expr(out, target, true);
            out.push('[');
            write_expr(out, index, false);
            out.push(']');
        }
        Expr::Call { name, args, .. } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg, false);
            }
            out.push(')');
        }
        Expr::Vector { parts, .. } => {
            out.push('(');
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, part, false);
            }
            out.push(')');
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_expr(&mut out, self, false);
        write!(f, "{}", out)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_stmt(&mut out, self, 0);
        write!(f, "{}", out)
    }
}

// ============================================================================
// Tests
// ============================================================================
