//! Type expression parsing.

use super::parser::Parser;
use crate::ast::types::{TypeExpr, TypeExprKind};
use crate::ast::{Ident, ParseError};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse a type expression.
    ///
    /// Grammar: `(IDENT | '[' TYPE ']') '?'?`
    ///
    /// Nested arrays are accepted here; the declaration pass rejects them.
    pub fn parse_type(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        let token = *self.peek();

        let (kind, mut span) = match token.kind {
            TokenKind::Identifier => {
                self.advance();
                (
                    TypeExprKind::Named(Ident::new(token.lexeme, token.span)),
                    token.span,
                )
            }
            TokenKind::LeftBracket => {
                self.advance();
                let element: &'ast TypeExpr<'ast> = self.arena.alloc(self.parse_type()?);
                let end = self.expect(TokenKind::RightBracket)?.span;
                (TypeExprKind::Array(element), token.span.merge(end))
            }
            _ => {
                return Err(ParseError::expected_type(
                    token.span,
                    token.kind.description(),
                ));
            }
        };

        let nullable = match self.eat(TokenKind::Question) {
            Some(q) => {
                span = span.merge(q.span);
                true
            }
            None => false,
        };

        Ok(TypeExpr {
            id: self.next_id(),
            kind,
            nullable,
            span,
        })
    }
}
