// quill-parser - Parser for Quill
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Recursive descent parser for Quill source code.
//!
//! Converts tokens into `Stmt`/`Expr` AST nodes. Parsing is fused with
//! scope construction: declarations reserve their slot in the
//! enclosing `Scope` immediately, and every block allocates its child
//! scope here so the evaluator never creates scopes at run time.

use std::fmt;

use crate::ast::{AssignOp, BinOp, Block, Expr, Pos, Stmt, UnOp};
use crate::lexer::{LexError, Lexed, Lexer, LintEntry, Token};
use crate::scope::{Scope, VarError};
use crate::value::{ElemKind, Kind, Val};

/// Parser error with position and the owning source name.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub source: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error in {} at {}:{}: {}",
            self.source, self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// The parser converts tokens into AST nodes bound to scopes.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    source: String,
    current: Lexed,
}

impl<'a> Parser<'a> {
    /// Create a parser for `src`. `source` names the script for
    /// diagnostics; `start_line` continues the line count across
    /// incremental parse calls.
    pub fn new(source: &str, src: &'a str, start_line: usize) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(src, start_line);
        let current = lexer.next_token().map_err(|e| ParseError {
            source: source.to_string(),
            line: e.line,
            column: e.column,
            message: format!("unexpected character '{}'", e.text),
        })?;
        Ok(Parser {
            lexer,
            source: source.to_string(),
            current,
        })
    }

    /// Line number after the last consumed token, for threading into
    /// the next incremental parse.
    pub fn line(&self) -> usize {
        self.lexer.line()
    }

    /// Diagnostic spans recorded while lexing, for editor tooling.
    pub fn take_lint(&mut self) -> Vec<LintEntry> {
        self.lexer.take_lint()
    }

    /// Parse statements into `scope` until the source is exhausted.
    pub fn parse(&mut self, scope: &Scope) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while self.current.token != Token::Eof {
            stmts.push(self.statement(scope)?);
        }
        Ok(stmts)
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn pos(&self) -> Pos {
        Pos {
            line: self.current.line,
            column: self.current.column,
        }
    }

    fn advance(&mut self) -> Result<Lexed, ParseError> {
        let next = self.lexer.next_token().map_err(|e| self.lex_error(e))?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn expect(&mut self, token: Token) -> Result<Lexed, ParseError> {
        if self.current.token == token {
            self.advance()
        } else {
            Err(self.error(format!(
                "expected '{}', found '{}'",
                token, self.current.token
            )))
        }
    }

    fn lex_error(&self, e: LexError) -> ParseError {
        ParseError {
            source: self.source.clone(),
            line: e.line,
            column: e.column,
            message: format!("unexpected character '{}'", e.text),
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            source: self.source.clone(),
            line: self.current.line,
            column: self.current.column,
            message,
        }
    }

    fn var_error(&self, pos: Pos, e: VarError) -> ParseError {
        ParseError {
            source: self.source.clone(),
            line: pos.line,
            column: pos.column,
            message: e.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn statement(&mut self, scope: &Scope) -> Result<Stmt, ParseError> {
        match self.current.token {
            Token::KwIf => self.if_statement(scope),
            Token::KwWhile => self.while_statement(scope),
            Token::KwFor => self.for_statement(scope),
            Token::KwForeach => self.foreach_statement(scope),
            Token::KwReturn => self.return_statement(scope),
            _ => self.simple_statement(scope, true),
        }
    }

    /// Declaration, assignment or call. `semi` controls whether the
    /// trailing semicolon is consumed (the step clause of a `for`
    /// header omits it).
    fn simple_statement(&mut self, scope: &Scope, semi: bool) -> Result<Stmt, ParseError> {
        let stmt = match self.current.token {
            Token::TyBool
            | Token::TyInt
            | Token::TyFloat
            | Token::TyString
            | Token::TyFloat2
            | Token::TyFloat3
            | Token::TyFloat4 => self.declaration(scope)?,
            Token::Ident(_) => self.assignment_or_call(scope)?,
            _ => {
                return Err(self.error(format!(
                    "expected statement, found '{}'",
                    self.current.token
                )));
            }
        };
        if semi {
            self.expect(Token::Semi)?;
        }
        Ok(stmt)
    }

    fn declaration(&mut self, scope: &Scope) -> Result<Stmt, ParseError> {
        let pos = self.pos();
        let kind = self.type_name()?;
        let name = self.identifier()?;
        scope
            .decl_var(&name, kind)
            .map_err(|e| self.var_error(pos, e))?;
        let init = if self.current.token == Token::Assign {
            self.advance()?;
            Some(self.expression(scope)?)
        } else {
            None
        };
        Ok(Stmt::Decl {
            pos,
            scope: scope.clone(),
            name,
            kind,
            init,
        })
    }

    /// A declared type: a base type token with an optional `[]`.
    fn type_name(&mut self) -> Result<Kind, ParseError> {
        let base = match self.current.token {
            Token::TyBool => Kind::Bool,
            Token::TyInt => Kind::Int,
            Token::TyFloat => Kind::Float,
            Token::TyString => Kind::Str,
            Token::TyFloat2 => Kind::Float2,
            Token::TyFloat3 => Kind::Float3,
            Token::TyFloat4 => Kind::Float4,
            ref other => {
                return Err(self.error(format!("expected type name, found '{}'", other)));
            }
        };
        self.advance()?;
        if self.current.token == Token::LBracket {
            self.advance()?;
            self.expect(Token::RBracket)?;
            let elem = match base {
                Kind::Bool => ElemKind::Bool,
                Kind::Int => ElemKind::Int,
                Kind::Float => ElemKind::Float,
                Kind::Str => ElemKind::Str,
                other => {
                    return Err(self.error(format!("arrays of {} are not supported", other)));
                }
            };
            return Ok(Kind::Array(elem));
        }
        Ok(base)
    }

    fn identifier(&mut self) -> Result<String, ParseError> {
        match self.current.token {
            Token::Ident(_) => {
                let taken = self.advance()?;
                match taken.token {
                    Token::Ident(name) => Ok(name),
                    _ => unreachable!(),
                }
            }
            ref other => Err(self.error(format!("expected identifier, found '{}'", other))),
        }
    }

    fn assignment_or_call(&mut self, scope: &Scope) -> Result<Stmt, ParseError> {
        let pos = self.pos();
        let name = self.identifier()?;
        // A call statement: leave the arguments to the expression
        // parser and discard the result at run time.
        if self.current.token == Token::LParen {
            let args = self.call_args(scope)?;
            return Ok(Stmt::Expr {
                pos,
                expr: Expr::Call { pos, name, args },
            });
        }
        let index = if self.current.token == Token::LBracket {
            self.advance()?;
            let index = self.expression(scope)?;
            self.expect(Token::RBracket)?;
            Some(index)
        } else {
            None
        };
        let op = match self.current.token {
            Token::Assign => AssignOp::Set,
            Token::PlusAssign => AssignOp::Add,
            Token::MinusAssign => AssignOp::Sub,
            Token::StarAssign => AssignOp::Mul,
            Token::SlashAssign => AssignOp::Div,
            Token::PercentAssign => AssignOp::Mod,
            Token::AndAssign => AssignOp::And,
            Token::OrAssign => AssignOp::Or,
            ref other => {
                return Err(self.error(format!(
                    "expected assignment operator, found '{}'",
                    other
                )));
            }
        };
        self.advance()?;
        let value = self.expression(scope)?;
        Ok(Stmt::Assign {
            pos,
            scope: scope.clone(),
            name,
            index,
            op,
            value,
        })
    }

    fn if_statement(&mut self, scope: &Scope) -> Result<Stmt, ParseError> {
        let pos = self.pos();
        self.expect(Token::KwIf)?;
        self.expect(Token::LParen)?;
        let cond = self.expression(scope)?;
        self.expect(Token::RParen)?;
        let then_block = self.block(scope)?;
        let else_block = if self.current.token == Token::KwElse {
            self.advance()?;
            if self.current.token == Token::KwIf {
                // `else if` desugars to an else block holding the
                // nested if.
                let child = scope.child();
                let nested = self.if_statement(&child)?;
                Some(Block {
                    scope: child,
                    stmts: vec![nested],
                })
            } else {
                Some(self.block(scope)?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            pos,
            cond,
            then_block,
            else_block,
        })
    }

    fn while_statement(&mut self, scope: &Scope) -> Result<Stmt, ParseError> {
        let pos = self.pos();
        self.expect(Token::KwWhile)?;
        self.expect(Token::LParen)?;
        let cond = self.expression(scope)?;
        self.expect(Token::RParen)?;
        let body = self.block(scope)?;
        Ok(Stmt::While { pos, cond, body })
    }

    fn for_statement(&mut self, scope: &Scope) -> Result<Stmt, ParseError> {
        let pos = self.pos();
        self.expect(Token::KwFor)?;
        self.expect(Token::LParen)?;
        // The header clauses and the body share one scope, so the loop
        // variable declared in `init` is visible throughout.
        let loop_scope = scope.child();
        let init = self.simple_statement(&loop_scope, true)?;
        let cond = self.expression(&loop_scope)?;
        self.expect(Token::Semi)?;
        let step = self.simple_statement(&loop_scope, false)?;
        self.expect(Token::RParen)?;
        let body = self.block_stmts(&loop_scope)?;
        Ok(Stmt::For {
            pos,
            scope: loop_scope,
            init: Box::new(init),
            cond,
            step: Box::new(step),
            body,
        })
    }

    fn foreach_statement(&mut self, scope: &Scope) -> Result<Stmt, ParseError> {
        let pos = self.pos();
        self.expect(Token::KwForeach)?;
        self.expect(Token::LParen)?;
        let kind = self.type_name()?;
        let var = self.identifier()?;
        self.expect(Token::KwIn)?;
        // The source iterates in the enclosing scope; only the loop
        // variable lives in the body scope.
        let source = self.expression(scope)?;
        self.expect(Token::RParen)?;
        let body_scope = scope.child();
        body_scope
            .decl_param(&var, kind)
            .map_err(|e| self.var_error(pos, e))?;
        let stmts = self.block_stmts(&body_scope)?;
        Ok(Stmt::Foreach {
            pos,
            var,
            kind,
            source,
            body: Block {
                scope: body_scope,
                stmts,
            },
        })
    }

    fn return_statement(&mut self, scope: &Scope) -> Result<Stmt, ParseError> {
        let pos = self.pos();
        self.expect(Token::KwReturn)?;
        let value = if self.current.token == Token::Semi {
            None
        } else {
            Some(self.expression(scope)?)
        };
        self.expect(Token::Semi)?;
        Ok(Stmt::Return { pos, value })
    }

    /// A braced statement list in a fresh child scope.
    fn block(&mut self, scope: &Scope) -> Result<Block, ParseError> {
        let child = scope.child();
        let stmts = self.block_stmts(&child)?;
        Ok(Block {
            scope: child,
            stmts,
        })
    }

    /// The braces and statements of a block whose scope the caller
    /// already allocated.
    fn block_stmts(&mut self, scope: &Scope) -> Result<Vec<Stmt>, ParseError> {
        self.expect(Token::LBrace)?;
        let mut stmts = Vec::new();
        while self.current.token != Token::RBrace {
            if self.current.token == Token::Eof {
                return Err(self.error("unexpected end of input, expected '}'".to_string()));
            }
            stmts.push(self.statement(scope)?);
        }
        self.advance()?;
        Ok(stmts)
    }

    // ------------------------------------------------------------------
    // Expressions, by descending precedence
    // ------------------------------------------------------------------

    fn expression(&mut self, scope: &Scope) -> Result<Expr, ParseError> {
        self.logical_or(scope)
    }

    fn logical_or(&mut self, scope: &Scope) -> Result<Expr, ParseError> {
        let mut left = self.logical_and(scope)?;
        while self.current.token == Token::OrOr {
            let pos = self.pos();
            self.advance()?;
            let right = self.logical_and(scope)?;
            left = Expr::Binary {
                pos,
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn logical_and(&mut self, scope: &Scope) -> Result<Expr, ParseError> {
        let mut left = self.equality(scope)?;
        while self.current.token == Token::AndAnd {
            let pos = self.pos();
            self.advance()?;
            let right = self.equality(scope)?;
            left = Expr::Binary {
                pos,
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn equality(&mut self, scope: &Scope) -> Result<Expr, ParseError> {
        let mut left = self.relational(scope)?;
        loop {
            let op = match self.current.token {
                Token::Eq => BinOp::Eq,
                Token::Ne => BinOp::Ne,
                _ => break,
            };
            let pos = self.pos();
            self.advance()?;
            let right = self.relational(scope)?;
            left = Expr::Binary {
                pos,
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn relational(&mut self, scope: &Scope) -> Result<Expr, ParseError> {
        let mut left = self.additive(scope)?;
        loop {
            let op = match self.current.token {
                Token::Lt => BinOp::Lt,
                Token::Le => BinOp::Le,
                Token::Gt => BinOp::Gt,
                Token::Ge => BinOp::Ge,
                _ => break,
            };
            let pos = self.pos();
            self.advance()?;
            let right = self.additive(scope)?;
            left = Expr::Binary {
                pos,
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn additive(&mut self, scope: &Scope) -> Result<Expr, ParseError> {
        let mut left = self.multiplicative(scope)?;
        loop {
            let op = match self.current.token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            let pos = self.pos();
            self.advance()?;
            let right = self.multiplicative(scope)?;
            left = Expr::Binary {
                pos,
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn multiplicative(&mut self, scope: &Scope) -> Result<Expr, ParseError> {
        let mut left = self.unary(scope)?;
        loop {
            let op = match self.current.token {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Mod,
                _ => break,
            };
            let pos = self.pos();
            self.advance()?;
            let right = self.unary(scope)?;
            left = Expr::Binary {
                pos,
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self, scope: &Scope) -> Result<Expr, ParseError> {
        let op = match self.current.token {
            Token::Minus => UnOp::Neg,
            Token::Bang => UnOp::Not,
            _ => return self.postfix(scope),
        };
        let pos = self.pos();
        self.advance()?;
        // Fold a negated numeric literal directly.
        let operand = self.unary(scope)?;
        if op == UnOp::Neg {
            match operand {
                Expr::Literal {
                    val: Val::Int(n), ..
                } => {
                    return Ok(Expr::Literal {
                        pos,
                        val: Val::Int(-n),
                    });
                }
                Expr::Literal {
                    val: Val::Float(n), ..
                } => {
                    return Ok(Expr::Literal {
                        pos,
                        val: Val::Float(-n),
                    });
                }
                _ => {}
            }
        }
        Ok(Expr::Unary {
            pos,
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self, scope: &Scope) -> Result<Expr, ParseError> {
        let mut expr = self.primary(scope)?;
        while self.current.token == Token::LBracket {
            let pos = self.pos();
            self.advance()?;
            let index = self.expression(scope)?;
            self.expect(Token::RBracket)?;
            expr = Expr::Index {
                pos,
                target: Box::new(expr),
                index: Box::new(index),
            };
        }
        Ok(expr)
    }

    fn primary(&mut self, scope: &Scope) -> Result<Expr, ParseError> {
        let pos = self.pos();
        match self.current.token {
            Token::Int(n) => {
                self.advance()?;
                Ok(Expr::Literal {
                    pos,
                    val: Val::Int(n),
                })
            }
            Token::Float(n) => {
                self.advance()?;
                Ok(Expr::Literal {
                    pos,
                    val: Val::Float(n),
                })
            }
            Token::Str(_) => {
                let taken = self.advance()?;
                let Token::Str(s) = taken.token else {
                    unreachable!()
                };
                Ok(Expr::Literal {
                    pos,
                    val: Val::str(s),
                })
            }
            Token::True => {
                self.advance()?;
                Ok(Expr::Literal {
                    pos,
                    val: Val::Bool(true),
                })
            }
            Token::False => {
                self.advance()?;
                Ok(Expr::Literal {
                    pos,
                    val: Val::Bool(false),
                })
            }
            Token::Null => {
                self.advance()?;
                Ok(Expr::Literal {
                    pos,
                    val: Val::Null,
                })
            }
            Token::Ident(_) => {
                let name = self.identifier()?;
                if self.current.token == Token::LParen {
                    let args = self.call_args(scope)?;
                    Ok(Expr::Call { pos, name, args })
                } else {
                    Ok(Expr::Var {
                        pos,
                        scope: scope.clone(),
                        name,
                    })
                }
            }
            Token::LParen => self.paren(scope, pos),
            ref other => Err(self.error(format!("expected expression, found '{}'", other))),
        }
    }

    /// A parenthesized expression: either grouping or a float2/3/4
    /// constructor, decided by whether a comma follows the first part.
    fn paren(&mut self, scope: &Scope, pos: Pos) -> Result<Expr, ParseError> {
        self.expect(Token::LParen)?;
        let first = self.expression(scope)?;
        if self.current.token == Token::RParen {
            self.advance()?;
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.current.token == Token::Comma {
            self.advance()?;
            parts.push(self.expression(scope)?);
        }
        self.expect(Token::RParen)?;
        if parts.len() > 4 {
            return Err(self.error(format!(
                "vector constructors take 2 to 4 components, found {}",
                parts.len()
            )));
        }
        Ok(Expr::Vector { pos, parts })
    }

    fn call_args(&mut self, scope: &Scope) -> Result<Vec<Expr>, ParseError> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if self.current.token != Token::RParen {
            args.push(self.expression(scope)?);
            while self.current.token == Token::Comma {
                self.advance()?;
                args.push(self.expression(scope)?);
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (Scope, Vec<Stmt>) {
        let scope = Scope::new();
        let mut parser = Parser::new("test", src, 1).unwrap();
        let stmts = parser.parse(&scope).unwrap();
        (scope, stmts)
    }

    fn parse_err(src: &str) -> ParseError {
        let scope = Scope::new();
        match Parser::new("test", src, 1) {
            Ok(mut parser) => parser.parse(&scope).unwrap_err(),
            Err(e) => e,
        }
    }

    #[test]
    fn test_declaration_reserves_slot() {
        let (scope, stmts) = parse("int x = 5;");
        assert_eq!(stmts.len(), 1);
        // Parse-time declaration: the slot exists before evaluation.
        assert_eq!(scope.get("x").unwrap(), Val::Int(0));
    }

    #[test]
    fn test_duplicate_declaration_is_parse_error() {
        let err = parse_err("int x; int x;");
        assert!(err.message.contains("already declared"));
    }

    #[test]
    fn test_shadowing_parses() {
        parse("int x; if (true) { int x; x = 2; }");
    }

    #[test]
    fn test_array_type_names() {
        let (scope, _) = parse("int[] xs; string[] names;");
        assert_eq!(scope.kind_of("xs"), Some(Kind::Array(ElemKind::Int)));
        assert_eq!(scope.kind_of("names"), Some(Kind::Array(ElemKind::Str)));
    }

    #[test]
    fn test_vector_array_rejected() {
        let err = parse_err("float2[] vs;");
        assert!(err.message.contains("not supported"));
    }

    #[test]
    fn test_precedence() {
        let (_, stmts) = parse("int x = 1 + 2 * 3;");
        let Stmt::Decl {
            init: Some(init), ..
        } = &stmts[0]
        else {
            panic!("expected declaration");
        };
        assert_eq!(init.to_string(), "1 + (2 * 3)");
    }

    #[test]
    fn test_logical_precedence() {
        let (_, stmts) = parse("bool b = true || false && false;");
        let Stmt::Decl {
            init: Some(init), ..
        } = &stmts[0]
        else {
            panic!("expected declaration");
        };
        assert_eq!(init.to_string(), "true || (false && false)");
    }

    #[test]
    fn test_grouping_vs_vector() {
        let (_, stmts) = parse("int a = (1 + 2); float2 v = (1, 2);");
        let Stmt::Decl {
            init: Some(init), ..
        } = &stmts[0]
        else {
            panic!("expected declaration");
        };
        assert!(matches!(init, Expr::Binary { .. }));
        let Stmt::Decl {
            init: Some(init), ..
        } = &stmts[1]
        else {
            panic!("expected declaration");
        };
        assert!(matches!(init, Expr::Vector { parts, .. } if parts.len() == 2));
    }

    #[test]
    fn test_too_many_vector_parts() {
        let err = parse_err("float4 v = (1, 2, 3, 4, 5);");
        assert!(err.message.contains("2 to 4"));
    }

    #[test]
    fn test_if_else_if_chain() {
        let (_, stmts) = parse(
            "int x; if (x > 0) { x = 1; } else if (x < 0) { x = 2; } else { x = 3; }",
        );
        let Stmt::If {
            else_block: Some(else_block),
            ..
        } = &stmts[1]
        else {
            panic!("expected if");
        };
        assert!(matches!(else_block.stmts.as_slice(), [Stmt::If { .. }]));
    }

    #[test]
    fn test_for_header_shares_scope() {
        let (_, stmts) = parse("for (int i = 0; i < 10; i += 1) { int j = i; }");
        let Stmt::For { scope, body, .. } = &stmts[0] else {
            panic!("expected for");
        };
        assert!(scope.has_local("i"));
        assert!(scope.has_local("j"));
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_foreach_declares_loop_var() {
        let (_, stmts) = parse("int[] xs; foreach (int x in xs) { x = x + 1; }");
        let Stmt::Foreach { body, var, .. } = &stmts[1] else {
            panic!("expected foreach");
        };
        assert_eq!(var, "x");
        assert!(body.scope.has_local("x"));
        assert_eq!(body.scope.params(), vec!["x".to_string()]);
    }

    #[test]
    fn test_indexed_assignment() {
        let (_, stmts) = parse("float3 v; v[1] = 2.0;");
        let Stmt::Assign {
            index: Some(_), op, ..
        } = &stmts[1]
        else {
            panic!("expected indexed assignment");
        };
        assert_eq!(*op, AssignOp::Set);
    }

    #[test]
    fn test_compound_assignments() {
        let (_, stmts) =
            parse("int x; x += 1; x -= 1; x *= 2; x /= 2; x %= 2; bool b; b &= true; b |= false;");
        let ops: Vec<AssignOp> = stmts
            .iter()
            .filter_map(|s| match s {
                Stmt::Assign { op, .. } => Some(*op),
                _ => None,
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                AssignOp::Add,
                AssignOp::Sub,
                AssignOp::Mul,
                AssignOp::Div,
                AssignOp::Mod,
                AssignOp::And,
                AssignOp::Or,
            ]
        );
    }

    #[test]
    fn test_call_statement_and_expression() {
        let (_, stmts) = parse("print(\"hi\"); int n = max(1, 2);");
        assert!(matches!(
            &stmts[0],
            Stmt::Expr {
                expr: Expr::Call { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_return_with_and_without_value() {
        let (_, stmts) = parse("return;");
        assert!(matches!(&stmts[0], Stmt::Return { value: None, .. }));
        let (_, stmts) = parse("return 1 + 2;");
        assert!(matches!(&stmts[0], Stmt::Return { value: Some(_), .. }));
    }

    #[test]
    fn test_negative_literal_folds() {
        let (_, stmts) = parse("int x = -5;");
        let Stmt::Decl {
            init: Some(init), ..
        } = &stmts[0]
        else {
            panic!("expected declaration");
        };
        assert!(matches!(
            init,
            Expr::Literal {
                val: Val::Int(-5),
                ..
            }
        ));
    }

    #[test]
    fn test_error_position() {
        let err = parse_err("int x =\n  @;");
        assert_eq!(err.line, 2);
        assert_eq!(err.source, "test");
    }

    #[test]
    fn test_unexpected_token_message() {
        let err = parse_err("int x = ;");
        assert!(err.message.contains("expected expression"));
    }

    #[test]
    fn test_missing_close_brace() {
        let err = parse_err("if (true) { int x;");
        assert!(err.message.contains("expected '}'"));
    }

    #[test]
    fn test_line_threading() {
        let mut parser = Parser::new("test", "int x;\nint y;", 10).unwrap();
        let scope = Scope::new();
        parser.parse(&scope).unwrap();
        assert_eq!(parser.line(), 11);
    }

    #[test]
    fn test_lint_forwarded() {
        let scope = Scope::new();
        let mut parser = Parser::new("test", "int x; // note", 1).unwrap();
        parser.parse(&scope).unwrap();
        assert!(!parser.take_lint().is_empty());
    }
}
