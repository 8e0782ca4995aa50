//! Statement parsing.
//!
//! Trailing semicolons are optional everywhere, so statements are
//! delimited by their own grammar rather than by `;`.

use bumpalo::collections::Vec as BVec;

use super::parser::Parser;
use crate::ast::ParseError;
use crate::ast::decl::VarDecl;
use crate::ast::stmt::*;
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse a statement.
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::LeftBrace => {
                let block = self.parse_block()?;
                Ok(Stmt::Block(self.arena.alloc(block)))
            }
            TokenKind::Var => self.parse_var(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Break => {
                self.advance();
                self.eat(TokenKind::Semicolon);
                Ok(Stmt::Break(BreakStmt { span: token.span }))
            }
            TokenKind::Continue => {
                self.advance();
                self.eat(TokenKind::Semicolon);
                Ok(Stmt::Continue(ContinueStmt { span: token.span }))
            }
            TokenKind::Return => self.parse_return(),
            _ => self.parse_assign_or_expr(),
        }
    }

    /// Grammar: `'{' STATEMENT* '}'`
    pub fn parse_block(&mut self) -> Result<Block<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::LeftBrace)?.span;

        let mut stmts = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            stmts.push(self.parse_statement()?);
        }

        let end_span = self.expect(TokenKind::RightBrace)?.span;
        Ok(Block {
            id: self.next_id(),
            stmts: stmts.into_bump_slice(),
            span: start_span.merge(end_span),
        })
    }

    /// Grammar: `'var' IDENT '=' EXPR | 'var' IDENT ':' TYPE`
    fn parse_var(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::Var)?.span;

        let stmt = if self.peek_nth(1).kind == TokenKind::Equal {
            let name = self.expect_ident()?;
            self.advance();
            let init = self.parse_expr(0)?;
            Stmt::Var(self.arena.alloc(VarStmt {
                id: self.next_id(),
                name,
                init,
                span: start_span.merge(init.span()),
            }))
        } else {
            let decl = self.parse_var_decl()?;
            let decl: &'ast VarDecl<'ast> = self.arena.alloc(VarDecl {
                span: start_span.merge(decl.span),
                ..decl
            });
            Stmt::VarDecl(decl)
        };

        self.eat(TokenKind::Semicolon);
        Ok(stmt)
    }

    /// Grammar: `'if' '(' EXPR ')' STATEMENT ('else' STATEMENT)?`
    fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::If)?.span;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(TokenKind::RightParen)?;

        let then_branch: &'ast Stmt<'ast> = self.arena.alloc(self.parse_statement()?);
        let else_branch = if self.eat(TokenKind::Else).is_some() {
            let branch: &'ast Stmt<'ast> = self.arena.alloc(self.parse_statement()?);
            Some(branch)
        } else {
            None
        };

        let end_span = else_branch.unwrap_or(then_branch).span();
        Ok(Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: start_span.merge(end_span),
        })))
    }

    /// Grammar: `'while' '(' EXPR ')' STATEMENT`
    fn parse_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::While)?.span;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(TokenKind::RightParen)?;

        let body: &'ast Stmt<'ast> = self.arena.alloc(self.parse_statement()?);
        Ok(Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body,
            span: start_span.merge(body.span()),
        })))
    }

    /// Grammar: `'return' EXPR? ';'?`
    ///
    /// The value is absent when `;` or `}` follows immediately.
    fn parse_return(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::Return)?.span;

        let value = if self.check(TokenKind::Semicolon) || self.check(TokenKind::RightBrace) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        self.eat(TokenKind::Semicolon);

        let span = value.map_or(start_span, |v| start_span.merge(v.span()));
        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    /// Grammar: `EXPR ('=' EXPR)? ';'?`
    fn parse_assign_or_expr(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let target = self.parse_expr(0)?;

        let stmt = if self.eat(TokenKind::Equal).is_some() {
            let value = self.parse_expr(0)?;
            Stmt::Assign(self.arena.alloc(AssignStmt {
                target,
                value,
                span: target.span().merge(value.span()),
            }))
        } else {
            Stmt::Expr(ExprStmt {
                expr: target,
                span: target.span(),
            })
        };

        self.eat(TokenKind::Semicolon);
        Ok(stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, ParseErrorKind};
    use bumpalo::Bump;

    fn parse_one<'a>(source: &str, arena: &'a Bump) -> Stmt<'a> {
        let mut parser = Parser::new(source, arena).unwrap();
        let stmt = parser.parse_statement().unwrap();
        assert!(parser.is_eof(), "trailing input in {source:?}");
        stmt
    }

    #[test]
    fn parse_var_with_initializer() {
        let arena = Bump::new();
        match parse_one("var x = 1 + 2;", &arena) {
            Stmt::Var(var) => {
                assert_eq!(var.name.name, "x");
                assert!(matches!(var.init, Expr::Binary(_)));
            }
            other => panic!("expected var, got {other:?}"),
        }
    }

    #[test]
    fn parse_typed_var_without_initializer() {
        let arena = Bump::new();
        match parse_one("var t: Tree?", &arena) {
            Stmt::VarDecl(decl) => {
                assert_eq!(decl.name.name, "t");
                assert!(decl.ty.nullable);
                assert_eq!(decl.span.col, 1);
            }
            other => panic!("expected var decl, got {other:?}"),
        }
    }

    #[test]
    fn parse_if_else() {
        let arena = Bump::new();
        let Stmt::If(stmt) = parse_one("if (a) x = 1; else { x = 2 }", &arena) else {
            panic!("expected if");
        };
        assert!(matches!(stmt.then_branch, Stmt::Assign(_)));
        assert!(matches!(stmt.else_branch, Some(Stmt::Block(_))));
    }

    #[test]
    fn dangling_else_binds_to_nearest_if() {
        let arena = Bump::new();
        let Stmt::If(outer) = parse_one("if (a) if (b) x = 1 else x = 2", &arena) else {
            panic!("expected if");
        };
        assert!(outer.else_branch.is_none());
        assert!(matches!(outer.then_branch, Stmt::If(inner) if inner.else_branch.is_some()));
    }

    #[test]
    fn parse_while_with_break_and_continue() {
        let arena = Bump::new();
        let Stmt::While(stmt) = parse_one(
            "while (i < 10) { if (i == 5) break; continue }",
            &arena,
        ) else {
            panic!("expected while");
        };
        let Stmt::Block(body) = stmt.body else {
            panic!("expected block body");
        };
        assert_eq!(body.stmts.len(), 2);
        assert!(matches!(body.stmts[1], Stmt::Continue(_)));
    }

    #[test]
    fn parse_return_forms() {
        let arena = Bump::new();
        let Stmt::Block(block) = parse_one("{ return; return 1 return }", &arena) else {
            panic!("expected block");
        };
        let values: Vec<_> = block
            .stmts
            .iter()
            .map(|s| match s {
                Stmt::Return(r) => r.value.is_some(),
                other => panic!("expected return, got {other:?}"),
            })
            .collect();
        assert_eq!(values, vec![false, true, false]);
    }

    #[test]
    fn parse_assignment_to_index() {
        let arena = Bump::new();
        let Stmt::Assign(assign) = parse_one("arr[1] = 42", &arena) else {
            panic!("expected assignment");
        };
        assert!(matches!(assign.target, Expr::Index(_)));
        assert!(matches!(assign.value, Expr::Literal(l) if l.value == 42));
    }

    #[test]
    fn parse_expression_statement() {
        let arena = Bump::new();
        let stmt = parse_one("foo(1);", &arena);
        assert!(matches!(stmt, Stmt::Expr(e) if matches!(e.expr, Expr::Call(_))));
    }

    #[test]
    fn if_requires_parenthesized_condition() {
        let arena = Bump::new();
        let mut parser = Parser::new("if a x = 1", &arena).unwrap();
        let err = parser.parse_statement().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
    }
}
