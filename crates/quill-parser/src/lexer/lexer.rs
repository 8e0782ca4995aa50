//! Main lexer implementation for quill.
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s.
//! It dispatches on the first character of each token.
//!
//! Lexemes are copied into the arena, so the source string may be freed
//! after lexing completes.

use std::collections::VecDeque;

use bumpalo::Bump;

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};
use quill_core::{LexError, Span};

/// Lexer for quill source code.
///
/// Converts source text into a stream of tokens. Provides lookahead
/// via [`peek`](Self::peek) and [`peek_nth`](Self::peek_nth).
///
/// The first lexical error is recorded and surfaced through
/// [`take_error`](Self::take_error); the offending position yields a
/// [`TokenKind::Error`] token.
pub struct Lexer<'src, 'ast> {
    /// Low-level character cursor.
    cursor: Cursor<'src>,
    /// Arena for allocating token lexemes.
    arena: &'ast Bump,
    /// Lookahead buffer for peeking.
    lookahead: VecDeque<Token<'ast>>,
    /// First error encountered.
    error: Option<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            lookahead: VecDeque::with_capacity(4),
            error: None,
        }
    }

    /// Take the recorded error, if any.
    pub fn take_error(&mut self) -> Option<LexError> {
        self.error.take()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'ast> {
        if let Some(token) = self.lookahead.pop_front() {
            return token;
        }
        self.scan_token()
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Token<'ast> {
        self.peek_nth(0)
    }

    /// Peek `n` tokens ahead (0 = next token).
    pub fn peek_nth(&mut self, n: usize) -> Token<'ast> {
        while self.lookahead.len() <= n {
            let token = self.scan_token();
            self.lookahead.push_back(token);
        }
        self.lookahead[n]
    }

    /// Lex the whole input, stopping after `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token<'ast>>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> Token<'ast> {
        loop {
            self.skip_whitespace();

            if self.cursor.is_eof() {
                return self.make_eof();
            }

            // Line comment
            if self.cursor.peek() == Some('/') && self.cursor.peek_nth(1) == Some('/') {
                self.cursor.eat_while(|c| c != '\n');
                continue;
            }
            break;
        }

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        match self.cursor.peek() {
            Some(c) if c.is_ascii_digit() => self.scan_number(start_line, start_col, start_offset),
            Some(c) if is_ident_start(c) => {
                self.scan_identifier(start_line, start_col, start_offset)
            }
            _ => self.scan_operator(start_line, start_col, start_offset),
        }
    }

    fn skip_whitespace(&mut self) {
        self.cursor.eat_while(|c| c.is_ascii_whitespace());
    }

    fn make_eof(&self) -> Token<'ast> {
        let span = Span::point(self.cursor.line(), self.cursor.column());
        Token::new(TokenKind::Eof, "", span)
    }

    /// Create a token from start position to current position.
    fn make_token(
        &self,
        kind: TokenKind,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let len = self.cursor.offset() - start_offset;
        let span = Span::new(start_line, start_col, len);
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start_offset));
        Token::new(kind, lexeme, span)
    }

    /// Record an error (first one wins) and produce an error token.
    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        if self.error.is_none() {
            self.error = Some(error);
        }
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Scanning: Numbers and identifiers
    // =========================================

    fn scan_number(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let digits = self.cursor.eat_while(|c| c.is_ascii_digit());
        let span = Span::new(start_line, start_col, digits.len() as u32);
        if let Err(e) = digits.parse::<i64>() {
            return self.make_error(LexError::InvalidNumber {
                span,
                detail: e.to_string(),
            });
        }
        self.make_token(TokenKind::IntLiteral, start_line, start_col, start_offset)
    }

    fn scan_identifier(
        &mut self,
        start_line: u32,
        start_col: u32,
        start_offset: u32,
    ) -> Token<'ast> {
        let text = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Operators and punctuation
    // =========================================

    fn scan_operator(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return self.make_eof();
        };

        use TokenKind::*;
        let kind = match c {
            '{' => LeftBrace,
            '}' => RightBrace,
            '[' => LeftBracket,
            ']' => RightBracket,
            '(' => LeftParen,
            ')' => RightParen,
            ',' => Comma,
            '.' => Dot,
            ';' => Semicolon,
            ':' => Colon,
            '?' => Question,
            '+' => Plus,
            '*' => Star,
            '/' => Slash,
            '%' => Percent,
            '-' => {
                if self.cursor.eat('>') {
                    Arrow
                } else {
                    Minus
                }
            }
            '!' => {
                if self.cursor.eat('=') {
                    BangEqual
                } else {
                    Bang
                }
            }
            '=' => {
                if self.cursor.eat('=') {
                    EqualEqual
                } else {
                    Equal
                }
            }
            '<' => {
                if self.cursor.eat('=') {
                    LessEqual
                } else {
                    Less
                }
            }
            '>' => {
                if self.cursor.eat('=') {
                    GreaterEqual
                } else {
                    Greater
                }
            }
            '&' => {
                if self.cursor.eat('&') {
                    AmpAmp
                } else {
                    Amp
                }
            }
            '|' => {
                if self.cursor.eat('|') {
                    PipePipe
                } else {
                    Pipe
                }
            }
            other => {
                let span = Span::new(start_line, start_col, other.len_utf8() as u32);
                return self.make_error(LexError::UnexpectedChar { ch: other, span });
            }
        };

        self.make_token(kind, start_line, start_col, start_offset)
    }
}
