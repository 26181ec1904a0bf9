//! Streaming tokenizer for SignalLang source text.
//!
//! The lexer hands out one token per call and tracks 1-based line/column
//! positions. Once the end of input is reached it keeps returning [`TokenKind::Eof`]
//! and never backs up, which is what the generator's one-token lookahead relies on.

use crate::diag::{Phase, Reporter};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    FloatLit,
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    Semicolon,
    Eof,
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Ident => "IDENT",
            TokenKind::FloatLit => "FLOAT_LIT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Eof => "EOF",
            TokenKind::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: i32,
    pub column: i32,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, line: i32, column: i32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

pub struct Lexer {
    src: Vec<char>,
    idx: usize,
    line: i32,
    col: i32,
    reporter: Rc<RefCell<Reporter>>,
}

impl Lexer {
    pub fn new(reporter: Rc<RefCell<Reporter>>) -> Self {
        Self {
            src: Vec::new(),
            idx: 0,
            line: 1,
            col: 1,
            reporter,
        }
    }

    /// Install new source text and rewind to the start.
    pub fn set_source(&mut self, source: &str) {
        self.src = source.chars().collect();
        self.idx = 0;
        self.line = 1;
        self.col = 1;
    }

    fn eof(&self) -> bool {
        self.idx >= self.src.len()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.src.get(self.idx + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(0), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn is_ident_start(c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_'
    }

    fn is_ident_body(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    fn report(&self, message: impl Into<String>) {
        self.reporter
            .borrow_mut()
            .error(Phase::Lexical, message, Some(self.line), Some(self.col));
    }

    fn lex_identifier(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let mut lexeme = String::new();
        while matches!(self.peek(0), Some(c) if Self::is_ident_body(c)) {
            lexeme.push(self.bump().unwrap());
        }
        Token::new(TokenKind::Ident, lexeme, line, col)
    }

    // Accepted forms: 123  3.14  .5  12.
    // Numbers without a dot still lex as FloatLit; the language has a single
    // numeric type and the literal text is carried through unparsed.
    fn lex_number(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let mut lexeme = String::new();

        if self.peek(0) == Some('.') {
            lexeme.push(self.bump().unwrap());
            if !matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                self.report("Malformed number literal: '.' not followed by digits");
                return Token::new(TokenKind::Unknown, lexeme, line, col);
            }
            while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                lexeme.push(self.bump().unwrap());
            }
            return Token::new(TokenKind::FloatLit, lexeme, line, col);
        }

        while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
            lexeme.push(self.bump().unwrap());
        }
        if self.peek(0) == Some('.') {
            lexeme.push(self.bump().unwrap());
            while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                lexeme.push(self.bump().unwrap());
            }
        }
        Token::new(TokenKind::FloatLit, lexeme, line, col)
    }

    fn lex_operator_or_symbol(&mut self) -> Token {
        let (line, col) = (self.line, self.col);
        let c = self.bump().unwrap_or('\0');
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => TokenKind::Assign,
            ';' => TokenKind::Semicolon,
            _ => {
                self.reporter.borrow_mut().error(
                    Phase::Lexical,
                    format!("Unrecognized symbol '{c}'"),
                    Some(line),
                    Some(col),
                );
                TokenKind::Unknown
            }
        };
        Token::new(kind, c.to_string(), line, col)
    }

    /// Return the next token from the stream. Idempotent at end of input.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        if self.eof() {
            return Token::new(TokenKind::Eof, "<EOF>", self.line, self.col);
        }

        let c = self.peek(0).unwrap();
        if Self::is_ident_start(c) {
            return self.lex_identifier();
        }
        if c.is_ascii_digit()
            || (c == '.' && matches!(self.peek(1), Some(d) if d.is_ascii_digit()))
        {
            return self.lex_number();
        }
        self.lex_operator_or_symbol()
    }

    /// One-shot convenience: lex everything, including the final Eof token.
    pub fn tokenize(&mut self, source: &str) -> Vec<Token> {
        self.set_source(source);
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token();
            let done = t.kind == TokenKind::Eof;
            tokens.push(t);
            if done {
                break;
            }
        }
        tokens
    }

    /// Symbol-table-connected variant of [`tokenize`](Self::tokenize): every
    /// identifier sighting mints a speculative Token placeholder in the
    /// current scope. Placeholder insertion refuses duplicates silently.
    pub fn tokenize_with_symbols(
        &mut self,
        source: &str,
        sym: &mut crate::symtab::SymbolTable,
    ) -> Vec<Token> {
        let tokens = self.tokenize(source);
        for t in &tokens {
            if t.kind == TokenKind::Ident {
                sym.insert_token_placeholder(&t.lexeme, t.line);
            }
        }
        tokens
    }
}
