//! Expression parsing using Pratt parsing (precedence climbing).

use bumpalo::collections::Vec as BVec;

use super::parser::Parser;
use crate::ast::expr::*;
use crate::ast::types::TypeExpr;
use crate::ast::{BinaryOp, Ident, POSTFIX_BINDING_POWER, ParseError, ParseErrorKind, UnaryOp};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse an expression with a minimum binding power.
    ///
    /// Only operators binding at least as tightly as `min_bp` are consumed,
    /// so `parse_expr(0)` parses a full expression.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let kind = self.peek().kind;

            if matches!(
                kind,
                TokenKind::LeftBracket | TokenKind::Dot | TokenKind::LeftParen
            ) {
                if POSTFIX_BINDING_POWER < min_bp {
                    break;
                }
                lhs = match kind {
                    TokenKind::LeftBracket => self.parse_index(lhs)?,
                    TokenKind::Dot => self.parse_field_access(lhs)?,
                    _ => self.parse_call(lhs)?,
                };
                continue;
            }

            if let Some(op) = BinaryOp::from_token(kind) {
                let (l_bp, r_bp) = op.binding_power();
                if l_bp < min_bp {
                    break;
                }

                self.advance();
                let rhs = self.parse_expr(r_bp)?;
                let span = lhs.span().merge(rhs.span());
                lhs = self.arena.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
                    id: self.next_id(),
                    left: lhs,
                    op,
                    right: rhs,
                    span,
                })));
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    /// Parse the start of an expression.
    fn parse_prefix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = token.lexeme.parse::<i64>().map_err(|e| {
                    ParseError::new(
                        ParseErrorKind::ExpectedExpression,
                        token.span,
                        format!("invalid integer literal '{}': {e}", token.lexeme),
                    )
                })?;
                Ok(self.arena.alloc(Expr::Literal(LiteralExpr {
                    id: self.next_id(),
                    value,
                    span: token.span,
                })))
            }

            TokenKind::Identifier => {
                self.advance();
                Ok(self.arena.alloc(Expr::Name(NameExpr {
                    id: self.next_id(),
                    ident: Ident::new(token.lexeme, token.span),
                    span: token.span,
                })))
            }

            // Parentheses only group; they produce no node.
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }

            TokenKind::Minus | TokenKind::Bang => {
                self.advance();
                let op = UnaryOp::from_token(token.kind).ok_or_else(|| {
                    ParseError::expected_expression(token.span, token.kind.description())
                })?;
                let operand = self.parse_expr(UnaryOp::binding_power())?;
                let span = token.span.merge(operand.span());
                Ok(self.arena.alloc(Expr::Unary(self.arena.alloc(UnaryExpr {
                    id: self.next_id(),
                    op,
                    operand,
                    span,
                }))))
            }

            TokenKind::New => self.parse_new(),

            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),

            _ => Err(ParseError::expected_expression(
                token.span,
                token.kind.description(),
            )),
        }
    }

    /// Grammar: `'new' TYPE ('{' (INIT (',' INIT)*)? '}')?`
    /// where `INIT := IDENT '=' EXPR | EXPR`.
    fn parse_new(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::New)?.span;
        let ty: &'ast TypeExpr<'ast> = self.arena.alloc(self.parse_type()?);
        let mut span = start_span.merge(ty.span);

        let mut inits = BVec::new_in(self.arena);
        if self.eat(TokenKind::LeftBrace).is_some() {
            while !self.check(TokenKind::RightBrace) {
                inits.push(self.parse_new_init()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            span = span.merge(self.expect(TokenKind::RightBrace)?.span);
        }

        Ok(self.arena.alloc(Expr::New(self.arena.alloc(NewExpr {
            id: self.next_id(),
            ty,
            inits: inits.into_bump_slice(),
            span,
        }))))
    }

    fn parse_new_init(&mut self) -> Result<NewInit<'ast>, ParseError> {
        if self.check(TokenKind::Identifier) && self.peek_nth(1).kind == TokenKind::Equal {
            let name = self.expect_ident()?;
            self.advance();
            let value = self.parse_expr(0)?;
            return Ok(NewInit::Field(FieldInit {
                id: self.next_id(),
                name,
                value,
                span: name.span.merge(value.span()),
            }));
        }
        Ok(NewInit::Element(self.parse_expr(0)?))
    }

    /// Grammar: `EXPR '[' EXPR ']'`
    fn parse_index(&mut self, array: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftBracket)?;
        let index = self.parse_expr(0)?;
        let end_span = self.expect(TokenKind::RightBracket)?.span;
        Ok(self.arena.alloc(Expr::Index(self.arena.alloc(IndexExpr {
            id: self.next_id(),
            array,
            index,
            span: array.span().merge(end_span),
        }))))
    }

    /// Grammar: `EXPR '.' IDENT`
    fn parse_field_access(
        &mut self,
        object: &'ast Expr<'ast>,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::Dot)?;
        let field = self.expect_ident()?;
        Ok(self.arena.alloc(Expr::Field(self.arena.alloc(FieldExpr {
            id: self.next_id(),
            object,
            field,
            span: object.span().merge(field.span),
        }))))
    }

    /// Grammar: `EXPR '(' (EXPR (',' EXPR)*)? ')'`
    fn parse_call(&mut self, callee: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftParen)?;

        let mut args = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightParen) {
            args.push(self.parse_expr(0)?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let end_span = self.expect(TokenKind::RightParen)?.span;
        Ok(self.arena.alloc(Expr::Call(self.arena.alloc(CallExpr {
            id: self.next_id(),
            callee,
            args: args.into_bump_slice(),
            span: callee.span().merge(end_span),
        }))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypeExprKind;
    use bumpalo::Bump;

    fn parse<'a>(source: &str, arena: &'a Bump) -> &'a Expr<'a> {
        let mut parser = Parser::new(source, arena).unwrap();
        let expr = parser.parse_expr(0).unwrap();
        assert!(parser.is_eof(), "trailing input in {source:?}");
        expr
    }

    #[test]
    fn parse_int_literal() {
        let arena = Bump::new();
        match parse("42", &arena) {
            Expr::Literal(lit) => assert_eq!(lit.value, 42),
            other => panic!("expected literal, got {other:?}"),
        }
    }

    #[test]
    fn parse_precedence() {
        let arena = Bump::new();
        // 1 + (2 * 3)
        let Expr::Binary(add) = parse("1 + 2 * 3", &arena) else {
            panic!("expected binary");
        };
        assert_eq!(add.op, BinaryOp::Add);
        assert!(matches!(add.right, Expr::Binary(mul) if mul.op == BinaryOp::Mul));
    }

    #[test]
    fn parse_left_associative() {
        let arena = Bump::new();
        // (10 - 2) - 3
        let Expr::Binary(outer) = parse("10 - 2 - 3", &arena) else {
            panic!("expected binary");
        };
        assert!(matches!(outer.left, Expr::Binary(inner) if inner.op == BinaryOp::Sub));
        assert!(matches!(outer.right, Expr::Literal(lit) if lit.value == 3));
    }

    #[test]
    fn parse_logical_below_relational() {
        let arena = Bump::new();
        let Expr::Binary(or) = parse("a < b || c >= d && e", &arena) else {
            panic!("expected binary");
        };
        assert_eq!(or.op, BinaryOp::LogicalOr);
        assert!(matches!(or.left, Expr::Binary(lt) if lt.op == BinaryOp::Less));
        assert!(matches!(or.right, Expr::Binary(and) if and.op == BinaryOp::LogicalAnd));
    }

    #[test]
    fn parse_parenthesized_creates_no_node() {
        let arena = Bump::new();
        let Expr::Binary(mul) = parse("(1 + 2) * 3", &arena) else {
            panic!("expected binary");
        };
        assert_eq!(mul.op, BinaryOp::Mul);
        assert!(matches!(mul.left, Expr::Binary(add) if add.op == BinaryOp::Add));
    }

    #[test]
    fn parse_unary_binds_tighter_than_binary() {
        let arena = Bump::new();
        let Expr::Binary(add) = parse("-a + !b", &arena) else {
            panic!("expected binary");
        };
        assert!(matches!(add.left, Expr::Unary(u) if u.op == UnaryOp::Neg));
        assert!(matches!(add.right, Expr::Unary(u) if u.op == UnaryOp::LogicalNot));
    }

    #[test]
    fn parse_unary_applies_after_postfix() {
        let arena = Bump::new();
        let Expr::Unary(neg) = parse("-a[0]", &arena) else {
            panic!("expected unary");
        };
        assert!(matches!(neg.operand, Expr::Index(_)));
    }

    #[test]
    fn parse_postfix_chain() {
        let arena = Bump::new();
        // ((t.children)[1]).value
        let Expr::Field(value) = parse("t.children[1].value", &arena) else {
            panic!("expected field");
        };
        assert_eq!(value.field.name, "value");
        let Expr::Index(index) = value.object else {
            panic!("expected index");
        };
        assert!(matches!(index.array, Expr::Field(f) if f.field.name == "children"));
    }

    #[test]
    fn parse_call_with_args() {
        let arena = Bump::new();
        let Expr::Call(call) = parse("foo(1, x + 2, bar())", &arena) else {
            panic!("expected call");
        };
        assert!(matches!(call.callee, Expr::Name(n) if n.ident.name == "foo"));
        assert_eq!(call.args.len(), 3);
        assert!(matches!(call.args[2], Expr::Call(inner) if inner.args.is_empty()));
    }

    #[test]
    fn parse_new_struct_with_field_inits() {
        let arena = Bump::new();
        let Expr::New(new) = parse("new Foo{ i = 1, j = 2 }", &arena) else {
            panic!("expected new");
        };
        assert!(matches!(new.ty.kind, TypeExprKind::Named(n) if n.name == "Foo"));
        let names: Vec<_> = new
            .inits
            .iter()
            .map(|init| match init {
                NewInit::Field(f) => f.name.name,
                NewInit::Element(_) => panic!("expected field init"),
            })
            .collect();
        assert_eq!(names, vec!["i", "j"]);
    }

    #[test]
    fn parse_new_array_with_elements() {
        let arena = Bump::new();
        let Expr::New(new) = parse("new [Int]{ 1, a == b, 3 }", &arena) else {
            panic!("expected new");
        };
        assert!(new.ty.is_array());
        assert_eq!(new.inits.len(), 3);
        assert!(new.inits.iter().all(|i| matches!(i, NewInit::Element(_))));
    }

    #[test]
    fn parse_new_without_braces() {
        let arena = Bump::new();
        let Expr::New(new) = parse("new [Int]", &arena) else {
            panic!("expected new");
        };
        assert!(new.inits.is_empty());
    }

    #[test]
    fn node_ids_are_distinct() {
        let arena = Bump::new();
        let Expr::Binary(add) = parse("a + b", &arena) else {
            panic!("expected binary");
        };
        assert_ne!(add.id, add.left.id());
        assert_ne!(add.left.id(), add.right.id());
    }

    #[test]
    fn missing_operand_is_an_error() {
        let arena = Bump::new();
        let mut parser = Parser::new("1 + ;", &arena).unwrap();
        let err = parser.parse_expr(0).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedExpression);
    }

    #[test]
    fn unclosed_call_is_an_error() {
        let arena = Bump::new();
        let mut parser = Parser::new("f(1, 2", &arena).unwrap();
        let err = parser.parse_expr(0).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    }
}
