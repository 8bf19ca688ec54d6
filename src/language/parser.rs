use crate::language::{
    ast::*,
    errors::{SyntaxError, SyntaxErrors},
    lexer::lex,
    span::Span,
    token::{Token, TokenKind},
};
use std::rc::Rc;

/// Parses a single expression, the unit every script is made of. Statements
/// only occur inside the bodies of function literals.
pub fn parse_expression_source(source: &str) -> Result<Expr, SyntaxErrors> {
    let tokens = match lex(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            let errs = errors
                .into_iter()
                .map(|err| SyntaxError::new("cannot tokenize script", err.message, err.span))
                .collect();
            return Err(SyntaxErrors::new(errs));
        }
    };
    Parser::new(tokens).parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// A simple statement in a control-clause position may turn out to be the
/// head of a range statement (`i, v := range xs`).
enum SimpleOrRange {
    Stmt(Stmt),
    Range {
        key: Option<Ident>,
        value: Option<Ident>,
        x: Expr,
    },
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse(mut self) -> Result<Expr, SyntaxErrors> {
        let result = self.parse_top();
        result.map_err(|err| SyntaxErrors::new(vec![err]))
    }

    fn parse_top(&mut self) -> Result<Expr, SyntaxError> {
        self.skip_semis();
        let expr = self.parse_expression()?;
        self.skip_semis();
        if !self.check(TokenKind::Eof) {
            return Err(self
                .error_here("unexpected tokens after expression")
                .with_help("a script is a single expression"));
        }
        Ok(expr)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(Span::empty)
    }

    fn previous_span(&self) -> Span {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span)
            .unwrap_or_else(Span::empty)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(&kind)
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(message))
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Result<Ident, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(_)) => {
                let token = self.advance();
                let TokenKind::Identifier(name) = token.kind else {
                    unreachable!()
                };
                Ok(Ident {
                    name,
                    span: token.span,
                })
            }
            _ => Err(self.error_here(message)),
        }
    }

    fn error_here(&self, message: &str) -> SyntaxError {
        let found = self
            .peek_kind()
            .map(TokenKind::describe)
            .unwrap_or_else(|| "end of input".to_string());
        SyntaxError::new(message, format!("unexpected {}", found), self.current_span())
    }

    fn skip_semis(&mut self) {
        while self.check(TokenKind::Semi) {
            self.advance();
        }
    }

    // ---- expressions ----

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary(0)
    }

    fn current_binary_op(&self) -> Option<(Op, u8)> {
        let op = match self.peek_kind()? {
            TokenKind::PipePipe => (Op::Lor, 1),
            TokenKind::AmpAmp => (Op::Land, 2),
            TokenKind::EqEq => (Op::Eql, 3),
            TokenKind::BangEq => (Op::Neq, 3),
            TokenKind::Lt => (Op::Lss, 3),
            TokenKind::LtEq => (Op::Leq, 3),
            TokenKind::Gt => (Op::Gtr, 3),
            TokenKind::GtEq => (Op::Geq, 3),
            TokenKind::Plus => (Op::Add, 4),
            TokenKind::Minus => (Op::Sub, 4),
            TokenKind::Star => (Op::Mul, 5),
            TokenKind::Slash => (Op::Quo, 5),
            TokenKind::Percent => (Op::Rem, 5),
            _ => return None,
        };
        Some(op)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;

        loop {
            let (op, prec) = match self.current_binary_op() {
                Some(info) => info,
                None => break,
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(prec + 1)?;
            let span = left.span().union(right.span());
            left = Expr::Binary {
                op,
                x: Box::new(left),
                y: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(TokenKind::Minus) {
            let start = self.advance().span;
            let expr = self.parse_unary()?;
            let span = start.union(expr.span());
            return Ok(Expr::Unary {
                op: Op::Sub,
                expr: Box::new(expr),
                span,
            });
        }
        if self.check(TokenKind::Bang) {
            let start = self.advance().span;
            let expr = self.parse_unary()?;
            let span = start.union(expr.span());
            return Ok(Expr::Unary {
                op: Op::Not,
                expr: Box::new(expr),
                span,
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(TokenKind::LParen) {
                let start = expr.span().start;
                let mut args = Vec::new();
                if !self.check(TokenKind::RParen) {
                    loop {
                        args.push(self.parse_expression()?);
                        if self.matches(TokenKind::Comma) {
                            continue;
                        }
                        break;
                    }
                }
                let end = self.expect(TokenKind::RParen, "expected ')' after arguments")?;
                expr = Expr::Call {
                    fun: Box::new(expr),
                    args,
                    span: Span::new(start, end.span.end),
                };
                continue;
            }
            if self.matches(TokenKind::LBracket) {
                let start = expr.span().start;
                let index = self.parse_expression()?;
                let end = self.expect(TokenKind::RBracket, "expected ']' after index")?;
                expr = Expr::Index {
                    x: Box::new(expr),
                    index: Box::new(index),
                    span: Span::new(start, end.span.end),
                };
                continue;
            }
            break;
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(_)) => {
                let ident = self.expect_identifier("expected identifier")?;
                Ok(Expr::Ident(ident))
            }
            Some(TokenKind::True) => {
                let span = self.advance().span;
                Ok(Expr::Ident(Ident {
                    name: "true".to_string(),
                    span,
                }))
            }
            Some(TokenKind::False) => {
                let span = self.advance().span;
                Ok(Expr::Ident(Ident {
                    name: "false".to_string(),
                    span,
                }))
            }
            Some(TokenKind::Int(_)) => {
                let token = self.advance();
                let TokenKind::Int(value) = token.kind else {
                    unreachable!()
                };
                Ok(Expr::Lit(Literal::Int(value, token.span)))
            }
            Some(TokenKind::Float(_)) => {
                let token = self.advance();
                let TokenKind::Float(value) = token.kind else {
                    unreachable!()
                };
                Ok(Expr::Lit(Literal::Float(value, token.span)))
            }
            Some(TokenKind::Str(_)) => {
                let token = self.advance();
                let TokenKind::Str(value) = token.kind else {
                    unreachable!()
                };
                Ok(Expr::Lit(Literal::Str(value, token.span)))
            }
            Some(TokenKind::Char(_)) => {
                let token = self.advance();
                let TokenKind::Char(value) = token.kind else {
                    unreachable!()
                };
                Ok(Expr::Lit(Literal::Char(value, token.span)))
            }
            Some(TokenKind::Func) => self.parse_func_lit(),
            Some(TokenKind::LBracket) => {
                let array_type = self.parse_array_type()?;
                if self.check(TokenKind::LBrace) {
                    self.parse_composite_body(Some(array_type))
                } else {
                    Ok(array_type)
                }
            }
            Some(TokenKind::LParen) => {
                let start = self.advance().span.start;
                let inner = self.parse_expression()?;
                let end = self.expect(TokenKind::RParen, "expected ')'")?;
                Ok(Expr::Paren(
                    Box::new(inner),
                    Span::new(start, end.span.end),
                ))
            }
            _ => Err(self.error_here("unexpected token in expression")),
        }
    }

    fn parse_array_type(&mut self) -> Result<Expr, SyntaxError> {
        let start = self
            .expect(TokenKind::LBracket, "expected '['")?
            .span
            .start;
        self.expect(TokenKind::RBracket, "expected ']' in array type")?;
        let elem = self.parse_type_expr()?;
        let span = Span::new(start, elem.span().end);
        Ok(Expr::ArrayType(ArrayType {
            elem: Box::new(elem),
            span,
        }))
    }

    fn parse_type_expr(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(TokenKind::LBracket) {
            return self.parse_array_type();
        }
        let ident = self.expect_identifier("expected type name")?;
        Ok(Expr::Ident(ident))
    }

    fn parse_composite_body(&mut self, typ: Option<Expr>) -> Result<Expr, SyntaxError> {
        let start = typ
            .as_ref()
            .map(|t| t.span().start)
            .unwrap_or_else(|| self.current_span().start);
        self.expect(TokenKind::LBrace, "expected '{' in composite literal")?;
        let mut elems = Vec::new();
        if !self.check(TokenKind::RBrace) {
            loop {
                let elem = if self.check(TokenKind::LBrace) {
                    // nested array literal with elided element type
                    self.parse_composite_body(None)?
                } else {
                    self.parse_expression()?
                };
                elems.push(elem);
                if self.matches(TokenKind::Comma) {
                    if self.check(TokenKind::RBrace) {
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace, "expected '}' after composite literal")?;
        Ok(Expr::CompositeLit(CompositeLit {
            typ: typ.map(Box::new),
            elems,
            span: Span::new(start, end.span.end),
        }))
    }

    fn parse_func_lit(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.expect(TokenKind::Func, "expected 'func'")?.span.start;
        self.expect(TokenKind::LParen, "expected '(' after 'func'")?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "expected ')' after parameters")?;
        let results = self.parse_results()?;
        let body = self.parse_block()?;
        let span = Span::new(start, body.span.end);
        Ok(Expr::FuncLit(Rc::new(FuncLit {
            typ: FuncType { params, results },
            body,
            span,
        })))
    }

    // Parameter groups keep the stock field-list shape: `a, b T` is one
    // field with two names, a lone `a` is a field whose type slot holds the
    // identifier. The preprocessor flattens both forms.
    fn parse_params(&mut self) -> Result<Vec<Field>, SyntaxError> {
        let mut fields = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                let ident = self.expect_identifier("expected parameter name")?;
                if self.matches(TokenKind::Comma) {
                    pending.push(ident);
                    continue;
                }
                if self.check(TokenKind::RParen) {
                    pending.push(ident);
                    break;
                }
                let typ = self.parse_type_expr()?;
                let span = pending
                    .first()
                    .map(|first| first.span)
                    .unwrap_or(ident.span)
                    .union(typ.span());
                pending.push(ident);
                fields.push(Field {
                    names: std::mem::take(&mut pending),
                    typ: Some(typ),
                    span,
                });
                if self.matches(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }

        for ident in pending {
            let span = ident.span;
            fields.push(Field {
                names: Vec::new(),
                typ: Some(Expr::Ident(ident)),
                span,
            });
        }
        Ok(fields)
    }

    fn parse_results(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::LBrace) => Ok(Vec::new()),
            Some(TokenKind::LParen) => {
                self.advance();
                let mut results = Vec::new();
                if !self.check(TokenKind::RParen) {
                    loop {
                        results.push(self.parse_type_expr()?);
                        if self.matches(TokenKind::Comma) {
                            continue;
                        }
                        break;
                    }
                }
                self.expect(TokenKind::RParen, "expected ')' after result types")?;
                Ok(results)
            }
            Some(TokenKind::Identifier(_)) | Some(TokenKind::LBracket) => {
                Ok(vec![self.parse_type_expr()?])
            }
            _ => Ok(Vec::new()),
        }
    }

    // ---- statements ----

    fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let start = self.expect(TokenKind::LBrace, "expected '{'")?.span.start;
        let mut stmts = Vec::new();
        loop {
            self.skip_semis();
            if self.check(TokenKind::RBrace) || self.check(TokenKind::Eof) {
                break;
            }
            stmts.push(self.parse_statement()?);
            if self.check(TokenKind::RBrace) {
                break;
            }
            if !self.matches(TokenKind::Semi) {
                return Err(self
                    .error_here("expected newline or ';' after statement")
                    .with_help("statements are separated by newlines or semicolons"));
            }
        }
        let end = self.expect(TokenKind::RBrace, "expected '}' to close block")?;
        Ok(Block {
            stmts,
            span: Span::new(start, end.span.end),
        })
    }

    fn parse_statement(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Var) => self.parse_decl(),
            Some(TokenKind::Return) => self.parse_return(),
            Some(TokenKind::Break) => {
                let span = self.advance().span;
                Ok(Stmt::Branch(BranchStmt {
                    kind: BranchKind::Break,
                    span,
                }))
            }
            Some(TokenKind::Continue) => {
                let span = self.advance().span;
                Ok(Stmt::Branch(BranchStmt {
                    kind: BranchKind::Continue,
                    span,
                }))
            }
            Some(TokenKind::If) => {
                self.advance();
                self.parse_if_stmt()
            }
            Some(TokenKind::For) => {
                self.advance();
                self.parse_for_stmt()
            }
            Some(TokenKind::LBrace) => Ok(Stmt::Block(self.parse_block()?)),
            _ => match self.parse_simple_stmt(false)? {
                SimpleOrRange::Stmt(stmt) => Ok(stmt),
                SimpleOrRange::Range { .. } => {
                    Err(self.error_here("range clause outside for statement"))
                }
            },
        }
    }

    fn parse_decl(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.expect(TokenKind::Var, "expected 'var'")?.span.start;
        let mut names = vec![self.expect_identifier("expected variable name")?];
        while self.matches(TokenKind::Comma) {
            names.push(self.expect_identifier("expected variable name")?);
        }
        let typ = if !self.check(TokenKind::Eq) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Eq, "expected '=' in var declaration")?;
        let mut values = vec![self.parse_expression()?];
        while self.matches(TokenKind::Comma) {
            values.push(self.parse_expression()?);
        }
        let end = self.previous_span().end;
        Ok(Stmt::Decl(DeclStmt {
            spec: ValueSpec { names, typ, values },
            span: Span::new(start, end),
        }))
    }

    fn parse_return(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.expect(TokenKind::Return, "expected 'return'")?.span;
        let mut results = Vec::new();
        if !self.check(TokenKind::Semi) && !self.check(TokenKind::RBrace) {
            loop {
                results.push(self.parse_expression()?);
                if self.matches(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        let end = if results.is_empty() {
            start.end
        } else {
            self.previous_span().end
        };
        Ok(Stmt::Return(ReturnStmt {
            results,
            span: Span::new(start.start, end),
        }))
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.previous_span().start;
        let first = self.parse_simple_stmt(false)?;
        let (init, cond) = if self.matches(TokenKind::Semi) {
            let SimpleOrRange::Stmt(init) = first else {
                return Err(self.error_here("range clause not allowed in if statement"));
            };
            (Some(init), self.parse_expression()?)
        } else {
            match first {
                SimpleOrRange::Stmt(Stmt::Expr(expr)) => (None, *expr),
                _ => return Err(self.error_here("expected ';' after if initializer")),
            }
        };
        let body = self.parse_block()?;
        let else_branch = if self.matches(TokenKind::Else) {
            if self.matches(TokenKind::If) {
                Some(self.parse_if_stmt()?)
            } else {
                Some(Stmt::Block(self.parse_block()?))
            }
        } else {
            None
        };
        let end = self.previous_span().end;
        Ok(Stmt::If(Box::new(IfStmt {
            init,
            cond,
            body,
            else_branch,
            span: Span::new(start, end),
        })))
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.previous_span().start;

        if self.check(TokenKind::LBrace) {
            let body = self.parse_block()?;
            let span = Span::new(start, body.span.end);
            return Ok(Stmt::For(Box::new(ForStmt {
                init: None,
                cond: None,
                post: None,
                body,
                span,
            })));
        }

        if self.matches(TokenKind::Range) {
            let x = self.parse_expression()?;
            let body = self.parse_block()?;
            let span = Span::new(start, body.span.end);
            return Ok(Stmt::Range(Box::new(RangeStmt {
                key: None,
                value: None,
                x,
                body,
                span,
            })));
        }

        match self.parse_simple_stmt(true)? {
            SimpleOrRange::Range { key, value, x } => {
                let body = self.parse_block()?;
                let span = Span::new(start, body.span.end);
                Ok(Stmt::Range(Box::new(RangeStmt {
                    key,
                    value,
                    x,
                    body,
                    span,
                })))
            }
            SimpleOrRange::Stmt(first) => {
                if self.matches(TokenKind::Semi) {
                    let cond = if self.check(TokenKind::Semi) {
                        None
                    } else {
                        Some(self.parse_expression()?)
                    };
                    self.expect(TokenKind::Semi, "expected ';' after for condition")?;
                    let post = if self.check(TokenKind::LBrace) {
                        None
                    } else {
                        match self.parse_simple_stmt(false)? {
                            SimpleOrRange::Stmt(stmt) => Some(stmt),
                            SimpleOrRange::Range { .. } => {
                                return Err(
                                    self.error_here("range clause not allowed in post statement")
                                );
                            }
                        }
                    };
                    let body = self.parse_block()?;
                    let span = Span::new(start, body.span.end);
                    Ok(Stmt::For(Box::new(ForStmt {
                        init: Some(first),
                        cond,
                        post,
                        body,
                        span,
                    })))
                } else {
                    let cond = match first {
                        Stmt::Expr(expr) => *expr,
                        _ => return Err(self.error_here("expected ';' after for initializer")),
                    };
                    let body = self.parse_block()?;
                    let span = Span::new(start, body.span.end);
                    Ok(Stmt::For(Box::new(ForStmt {
                        init: None,
                        cond: Some(cond),
                        post: None,
                        body,
                        span,
                    })))
                }
            }
        }
    }

    fn parse_simple_stmt(&mut self, allow_range: bool) -> Result<SimpleOrRange, SyntaxError> {
        let start = self.current_span().start;
        let mut lhs = vec![self.parse_expression()?];
        while self.matches(TokenKind::Comma) {
            lhs.push(self.parse_expression()?);
        }

        let op = match self.peek_kind() {
            Some(TokenKind::ColonEq) => Some(Op::Define),
            Some(TokenKind::Eq) => Some(Op::Assign),
            Some(TokenKind::PlusEq) => Some(Op::AddAssign),
            Some(TokenKind::MinusEq) => Some(Op::SubAssign),
            Some(TokenKind::StarEq) => Some(Op::MulAssign),
            Some(TokenKind::SlashEq) => Some(Op::QuoAssign),
            Some(TokenKind::PercentEq) => Some(Op::RemAssign),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();

            if allow_range
                && matches!(op, Op::Define | Op::Assign)
                && self.matches(TokenKind::Range)
            {
                let x = self.parse_expression()?;
                if lhs.len() > 2 {
                    return Err(self.error_here("too many variables in range clause"));
                }
                let mut idents = lhs.into_iter().map(|expr| match expr {
                    Expr::Ident(ident) => Ok(ident),
                    _ => Err(SyntaxError::new(
                        "expected identifier in range clause",
                        format!("found a {}", expr.kind_name()),
                        expr.span(),
                    )),
                });
                let key = idents.next().transpose()?;
                let value = idents.next().transpose()?;
                return Ok(SimpleOrRange::Range { key, value, x });
            }

            if op.strip_assign().is_some() && lhs.len() != 1 {
                return Err(self.error_here("compound assignment takes a single target"));
            }

            let mut rhs = vec![self.parse_expression()?];
            while self.matches(TokenKind::Comma) {
                rhs.push(self.parse_expression()?);
            }
            let end = self.previous_span().end;
            return Ok(SimpleOrRange::Stmt(Stmt::Assign(AssignStmt {
                op,
                lhs,
                rhs,
                span: Span::new(start, end),
            })));
        }

        if self.check(TokenKind::PlusPlus) || self.check(TokenKind::MinusMinus) {
            if lhs.len() != 1 {
                return Err(self.error_here("increment takes a single target"));
            }
            let token = self.advance();
            let op = if token.kind == TokenKind::PlusPlus {
                Op::Inc
            } else {
                Op::Dec
            };
            return Ok(SimpleOrRange::Stmt(Stmt::IncDec(IncDecStmt {
                op,
                expr: lhs.pop().expect("single target"),
                span: Span::new(start, token.span.end),
            })));
        }

        if lhs.len() != 1 {
            return Err(self.error_here("expected assignment after expression list"));
        }
        Ok(SimpleOrRange::Stmt(Stmt::Expr(Box::new(
            lhs.pop().expect("single expression"),
        ))))
    }
}
