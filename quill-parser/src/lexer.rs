// quill-parser - Lexer for Quill
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexer (tokeniser) for Quill source code.
//!
//! Converts one source fragment into tokens using an ordered table of
//! operator patterns - compound operators sit strictly before their
//! single-character prefixes, so `==` can never lex as two `=`.
//! Whitespace and `//` comments are elided from the token stream but
//! recorded into a side lint trace for editor tooling; evaluation never
//! reads it. The lexer is constructed with a starting line number so
//! fragments appended to one script keep a continuous line count.

use std::fmt;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AndAssign,
    OrAssign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,

    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    True,
    False,
    Null,

    // Words
    Ident(String),
    KwIf,
    KwElse,
    KwWhile,
    KwFor,
    KwForeach,
    KwIn,
    KwReturn,
    TyBool,
    TyInt,
    TyFloat,
    TyString,
    TyFloat2,
    TyFloat3,
    TyFloat4,

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Semi => write!(f, ";"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Assign => write!(f, "="),
            Token::PlusAssign => write!(f, "+="),
            Token::MinusAssign => write!(f, "-="),
            Token::StarAssign => write!(f, "*="),
            Token::SlashAssign => write!(f, "/="),
            Token::PercentAssign => write!(f, "%="),
            Token::AndAssign => write!(f, "&="),
            Token::OrAssign => write!(f, "|="),
            Token::Eq => write!(f, "=="),
            Token::Ne => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::Int(n) => write!(f, "{}", n),
            Token::Float(n) => write!(f, "{}", crate::value::fmt_float(*n)),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Ident(s) => write!(f, "{}", s),
            Token::KwIf => write!(f, "if"),
            Token::KwElse => write!(f, "else"),
            Token::KwWhile => write!(f, "while"),
            Token::KwFor => write!(f, "for"),
            Token::KwForeach => write!(f, "foreach"),
            Token::KwIn => write!(f, "in"),
            Token::KwReturn => write!(f, "return"),
            Token::TyBool => write!(f, "bool"),
            Token::TyInt => write!(f, "int"),
            Token::TyFloat => write!(f, "float"),
            Token::TyString => write!(f, "string"),
            Token::TyFloat2 => write!(f, "float2"),
            Token::TyFloat3 => write!(f, "float3"),
            Token::TyFloat4 => write!(f, "float4"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// Diagnostic category of a lexed span, consumed by editor tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    Whitespace,
    Comment,
    Keyword,
    TypeName,
    Identifier,
    Number,
    String,
    Literal,
    Operator,
    Punctuation,
}

/// One span in the lint trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintEntry {
    pub category: LintCategory,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

/// Lexer error: an unmatched character span, with position and the
/// offending text. Unrecoverable for the current fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub text: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lex error at {}:{}: unexpected input '{}'",
            self.line, self.column, self.text
        )
    }
}

impl std::error::Error for LexError {}

/// A scanned token with the position it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexed {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

/// Operators in match order: every compound operator precedes each of
/// its prefixes. The lexer walks this table front to back and takes
/// the first match.
const OPERATORS: &[(&str, Token)] = &[
    ("==", Token::Eq),
    ("!=", Token::Ne),
    ("<=", Token::Le),
    (">=", Token::Ge),
    ("&&", Token::AndAnd),
    ("||", Token::OrOr),
    ("+=", Token::PlusAssign),
    ("-=", Token::MinusAssign),
    ("*=", Token::StarAssign),
    ("/=", Token::SlashAssign),
    ("%=", Token::PercentAssign),
    ("&=", Token::AndAssign),
    ("|=", Token::OrAssign),
    ("=", Token::Assign),
    ("<", Token::Lt),
    (">", Token::Gt),
    ("!", Token::Bang),
    ("+", Token::Plus),
    ("-", Token::Minus),
    ("*", Token::Star),
    ("/", Token::Slash),
    ("%", Token::Percent),
];

const PUNCTUATION: &[(char, Token)] = &[
    ('(', Token::LParen),
    (')', Token::RParen),
    ('{', Token::LBrace),
    ('}', Token::RBrace),
    ('[', Token::LBracket),
    (']', Token::RBracket),
    (',', Token::Comma),
    (';', Token::Semi),
];

const KEYWORDS: &[(&str, Token)] = &[
    ("if", Token::KwIf),
    ("else", Token::KwElse),
    ("while", Token::KwWhile),
    ("for", Token::KwFor),
    ("foreach", Token::KwForeach),
    ("in", Token::KwIn),
    ("return", Token::KwReturn),
    ("bool", Token::TyBool),
    ("int", Token::TyInt),
    ("float", Token::TyFloat),
    ("string", Token::TyString),
    ("float2", Token::TyFloat2),
    ("float3", Token::TyFloat3),
    ("float4", Token::TyFloat4),
];

/// The lexer converts one source fragment into tokens.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    lint: Vec<LintEntry>,
    peeked: Option<Lexed>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer for a fragment, numbering lines from
    /// `start_line` so appended fragments keep a continuous count.
    pub fn new(src: &'a str, start_line: usize) -> Self {
        Lexer {
            src,
            pos: 0,
            line: start_line,
            column: 1,
            lint: Vec::new(),
            peeked: None,
        }
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Result<Lexed, LexError> {
        if let Some(lexed) = self.peeked.take() {
            return Ok(lexed);
        }
        self.scan_token()
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<&Lexed, LexError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan_token()?);
        }
        Ok(self.peeked.as_ref().unwrap())
    }

    /// True only when the fragment is fully consumed.
    pub fn end_of_stream(&mut self) -> Result<bool, LexError> {
        Ok(matches!(self.peek_token()?.token, Token::Eof))
    }

    /// Line number after all consumed input; threaded into the next
    /// fragment by `Script::add_statements`.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Drain the lint trace accumulated so far.
    pub fn take_lint(&mut self) -> Vec<LintEntry> {
        std::mem::take(&mut self.lint)
    }

    // ========================================================================
    // Internal scanning
    // ========================================================================

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn lint_span(&mut self, category: LintCategory, line: usize, column: usize, length: usize) {
        self.lint.push(LintEntry {
            category,
            line,
            column,
            length,
        });
    }

    /// Skip whitespace and `//` comments, recording their spans.
    fn skip_elided(&mut self) {
        loop {
            let (line, column) = (self.line, self.column);
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    let mut len = 0;
                    while let Some(c) = self.peek_char() {
                        if !c.is_whitespace() {
                            break;
                        }
                        self.advance_char();
                        len += 1;
                    }
                    self.lint_span(LintCategory::Whitespace, line, column, len);
                }
                Some('/') if self.rest().starts_with("//") => {
                    let mut len = 0;
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.advance_char();
                        len += 1;
                    }
                    self.lint_span(LintCategory::Comment, line, column, len);
                }
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Result<Lexed, LexError> {
        self.skip_elided();

        let (line, column) = (self.line, self.column);
        let lexed = |token, category: Option<LintCategory>, this: &mut Self, len: usize| {
            if let Some(cat) = category {
                this.lint_span(cat, line, column, len);
            }
            Ok(Lexed {
                token,
                line,
                column,
            })
        };

        let c = match self.peek_char() {
            Some(c) => c,
            None => {
                return Ok(Lexed {
                    token: Token::Eof,
                    line,
                    column,
                });
            }
        };

        // Punctuation
        for (ch, token) in PUNCTUATION {
            if c == *ch {
                self.advance_char();
                return lexed(token.clone(), Some(LintCategory::Punctuation), self, 1);
            }
        }

        // Operators, longest pattern first
        for (text, token) in OPERATORS {
            if self.rest().starts_with(text) {
                for _ in 0..text.len() {
                    self.advance_char();
                }
                return lexed(token.clone(), Some(LintCategory::Operator), self, text.len());
            }
        }

        if c == '"' {
            let (token, len) = self.scan_string(line, column)?;
            return lexed(token, Some(LintCategory::String), self, len);
        }

        if c.is_ascii_digit() {
            let (token, len) = self.scan_number(line, column)?;
            return lexed(token, Some(LintCategory::Number), self, len);
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = self.pos;
            while let Some(c) = self.peek_char() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    self.advance_char();
                } else {
                    break;
                }
            }
            let word = &self.src[start..self.pos];
            let len = word.len();

            for (text, token) in KEYWORDS {
                if word == *text {
                    let cat = if matches!(
                        token,
                        Token::TyBool
                            | Token::TyInt
                            | Token::TyFloat
                            | Token::TyString
                            | Token::TyFloat2
                            | Token::TyFloat3
                            | Token::TyFloat4
                    ) {
                        LintCategory::TypeName
                    } else {
                        LintCategory::Keyword
                    };
                    return lexed(token.clone(), Some(cat), self, len);
                }
            }
            // Boolean literals accept case variants; null is lowercase only.
            if word.eq_ignore_ascii_case("true") {
                return lexed(Token::True, Some(LintCategory::Literal), self, len);
            }
            if word.eq_ignore_ascii_case("false") {
                return lexed(Token::False, Some(LintCategory::Literal), self, len);
            }
            if word == "null" {
                return lexed(Token::Null, Some(LintCategory::Literal), self, len);
            }
            return lexed(
                Token::Ident(word.to_string()),
                Some(LintCategory::Identifier),
                self,
                len,
            );
        }

        Err(LexError {
            line,
            column,
            text: c.to_string(),
        })
    }

    fn scan_string(&mut self, line: usize, column: usize) -> Result<(Token, usize), LexError> {
        let start = self.pos;
        self.advance_char(); // opening quote
        let mut s = String::new();
        loop {
            match self.advance_char() {
                Some('"') => break,
                Some('\\') => match self.advance_char() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('0') => s.push('\0'),
                    Some('\\') => s.push('\\'),
                    Some('"') => s.push('"'),
                    Some(c) => {
                        return Err(LexError {
                            line: self.line,
                            column: self.column,
                            text: format!("\\{}", c),
                        });
                    }
                    None => {
                        return Err(LexError {
                            line,
                            column,
                            text: self.src[start..self.pos].to_string(),
                        });
                    }
                },
                Some(c) => s.push(c),
                None => {
                    return Err(LexError {
                        line,
                        column,
                        text: self.src[start..self.pos].to_string(),
                    });
                }
            }
        }
        Ok((Token::Str(s), self.pos - start))
    }

    fn scan_number(&mut self, line: usize, column: usize) -> Result<(Token, usize), LexError> {
        let start = self.pos;

        // Hex integer
        if self.rest().starts_with("0x") || self.rest().starts_with("0X") {
            self.advance_char();
            self.advance_char();
            let digits_start = self.pos;
            while let Some(c) = self.peek_char() {
                if c.is_ascii_hexdigit() {
                    self.advance_char();
                } else {
                    break;
                }
            }
            let digits = &self.src[digits_start..self.pos];
            let n = i64::from_str_radix(digits, 16).map_err(|_| LexError {
                line,
                column,
                text: self.src[start..self.pos].to_string(),
            })?;
            return Ok((Token::Int(n), self.pos - start));
        }

        let mut is_float = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else {
                break;
            }
        }
        // Fraction: a dot only counts when a digit follows it.
        if self.peek_char() == Some('.')
            && self.rest()[1..].chars().next().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.advance_char();
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    self.advance_char();
                } else {
                    break;
                }
            }
        }
        // Exponent
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let mark = self.pos;
            let mark_column = self.column;
            self.advance_char();
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                self.advance_char();
            }
            if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_digit() {
                        self.advance_char();
                    } else {
                        break;
                    }
                }
            } else {
                // Not an exponent after all; rewind to before the 'e'.
                self.pos = mark;
                self.column = mark_column;
            }
        }
        let text_end = self.pos;
        // Optional float suffix
        if matches!(self.peek_char(), Some('f') | Some('F')) {
            is_float = true;
            self.advance_char();
        }

        let text = &self.src[start..text_end];
        let token = if is_float {
            let n: f64 = text.parse().map_err(|_| LexError {
                line,
                column,
                text: text.to_string(),
            })?;
            Token::Float(n)
        } else {
            let n: i64 = text.parse().map_err(|_| LexError {
                line,
                column,
                text: text.to_string(),
            })?;
            Token::Int(n)
        };
        Ok((token, self.pos - start))
    }
}

// ============================================================================
// Tests
// ============================================================================
