// quill-parser - Lexer and parser for the Quill scripting language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # quill-parser
//!
//! Lexer and parser for the Quill scripting language. Produces
//! `Stmt`/`Expr` AST nodes bound to their lexical scopes from source
//! code strings.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod value;

pub use ast::{write_stmts, AssignOp, BinOp, Block, Expr, Pos, Stmt, UnOp};
pub use im::Vector;
pub use lexer::{LexError, Lexed, Lexer, LintCategory, LintEntry, Token};
pub use parser::{ParseError, Parser};
pub use scope::{Scope, VarError};
pub use value::{fmt_float, ArrayVal, CastError, ElemKind, Kind, Val};
