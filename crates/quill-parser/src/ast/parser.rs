//! Parser core: token navigation and top-level declarations.
//!
//! The parser is a hand-written recursive descent parser with Pratt parsing
//! for expressions. It stops at the first error.

use bumpalo::Bump;
use bumpalo::collections::Vec as BVec;

use crate::ast::decl::{FuncDecl, Item, StructDecl, VarDecl};
use crate::ast::stmt::Block;
use crate::ast::types::TypeExpr;
use crate::ast::{Ident, NodeId, ParseError, ParseErrorKind, Program};
use crate::lexer::{Lexer, Token, TokenKind};
use quill_core::{LexError, QuillError};

/// Parser for quill source code.
///
/// All AST nodes are allocated in the arena passed to [`Parser::new`] and
/// live as long as it does.
pub struct Parser<'ast> {
    /// Every token of the source, always terminated by `Eof`.
    tokens: Vec<Token<'ast>>,
    /// Index of the current token.
    position: usize,
    /// Arena for AST nodes.
    pub(crate) arena: &'ast Bump,
    /// Next node id to hand out.
    next_id: u32,
}

impl<'ast> Parser<'ast> {
    /// Lex `source` and prepare to parse it.
    pub fn new(source: &str, arena: &'ast Bump) -> Result<Self, LexError> {
        let tokens = Lexer::new(source, arena).tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            arena,
            next_id: 0,
        })
    }

    /// Parse a complete program.
    ///
    /// ```
    /// use quill_parser::Parser;
    /// use bumpalo::Bump;
    ///
    /// let arena = Bump::new();
    /// let program = Parser::parse("func main() { return; }", &arena).unwrap();
    /// assert_eq!(program.items().len(), 1);
    /// ```
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<Program<'ast>, QuillError> {
        let mut parser = Self::new(source, arena)?;
        Ok(parser.parse_program()?)
    }

    // =========================================
    // Token navigation
    // =========================================

    /// The current token.
    pub(crate) fn peek(&self) -> &Token<'ast> {
        self.peek_nth(0)
    }

    /// The token `n` positions ahead; clamps to `Eof`.
    pub(crate) fn peek_nth(&self, n: usize) -> &Token<'ast> {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)]
    }

    /// Consume the current token. Never moves past `Eof`.
    pub(crate) fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume the current token if it is of `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of `kind` or fail.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let token = *self.peek();
        if token.kind == TokenKind::Eof {
            Err(ParseError::unexpected_eof(token.span))
        } else {
            Err(ParseError::expected_token(
                token.span,
                kind.description(),
                token.kind.description(),
            ))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = *self.peek();
        if token.kind == TokenKind::Identifier {
            self.advance();
            Ok(Ident::new(token.lexeme, token.span))
        } else {
            Err(ParseError::expected_identifier(
                token.span,
                token.kind.description(),
            ))
        }
    }

    /// Hand out the next node id.
    pub(crate) fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    // =========================================
    // Declarations
    // =========================================

    /// Grammar: `(STRUCT | FUNC)* EOF`
    pub fn parse_program(&mut self) -> Result<Program<'ast>, ParseError> {
        let start_span = self.peek().span;
        let mut items = BVec::new_in(self.arena);

        while !self.is_eof() {
            items.push(self.parse_item()?);
        }

        let span = items
            .last()
            .map(|item: &Item<'ast>| start_span.merge(item.span()))
            .unwrap_or(start_span);
        Ok(Program::new(items.into_bump_slice(), self.next_id, span))
    }

    fn parse_item(&mut self) -> Result<Item<'ast>, ParseError> {
        let token = *self.peek();
        match token.kind {
            TokenKind::Func => Ok(Item::Func(self.arena.alloc(self.parse_function()?))),
            TokenKind::Struct => Ok(Item::Struct(self.arena.alloc(self.parse_struct()?))),
            _ => Err(ParseError::new(
                ParseErrorKind::ExpectedDeclaration,
                token.span,
                format!(
                    "expected the keyword 'func' or 'struct' at start of a declaration, found {}",
                    token.kind
                ),
            )),
        }
    }

    /// Grammar: `'struct' IDENT '{' ('var' IDENT ':' TYPE ';'?)* '}'`
    pub fn parse_struct(&mut self) -> Result<StructDecl<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::Struct)?.span;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LeftBrace)?;

        let mut fields = BVec::new_in(self.arena);
        while self.check(TokenKind::Var) {
            self.advance();
            fields.push(self.parse_var_decl()?);
            self.eat(TokenKind::Semicolon);
        }

        let end_span = self.expect(TokenKind::RightBrace)?.span;
        Ok(StructDecl {
            id: self.next_id(),
            name,
            fields: fields.into_bump_slice(),
            span: start_span.merge(end_span),
        })
    }

    /// Grammar: `'func' IDENT '(' (PARAM (',' PARAM)*)? ')' ('->' TYPE)? BLOCK`
    pub fn parse_function(&mut self) -> Result<FuncDecl<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::Func)?.span;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LeftParen)?;

        let mut params = BVec::new_in(self.arena);
        while self.check(TokenKind::Identifier) {
            params.push(self.parse_var_decl()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;

        let return_type = if self.eat(TokenKind::Arrow).is_some() {
            let ty: &'ast TypeExpr<'ast> = self.arena.alloc(self.parse_type()?);
            Some(ty)
        } else {
            None
        };

        let body: &'ast Block<'ast> = self.arena.alloc(self.parse_block()?);
        Ok(FuncDecl {
            id: self.next_id(),
            name,
            params: params.into_bump_slice(),
            return_type,
            body,
            span: start_span.merge(body.span),
        })
    }

    /// Grammar: `IDENT ':' TYPE`
    pub(crate) fn parse_var_decl(&mut self) -> Result<VarDecl<'ast>, ParseError> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty: &'ast TypeExpr<'ast> = self.arena.alloc(self.parse_type()?);
        Ok(VarDecl {
            id: self.next_id(),
            name,
            ty,
            span: name.span.merge(ty.span),
        })
    }
}
