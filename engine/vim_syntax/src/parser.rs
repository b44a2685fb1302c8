//! Recursive descent parser for Vim script expressions.
//!
//! Binary operators use precedence climbing over
//! [`BinaryOp::precedence`]; ternary and `??` sit above the climbing loop,
//! unary and postfix forms below it. Comparisons do not chain: `a == b == c`
//! stops after the first comparison and the remainder is reported as
//! trailing characters.

use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, ExprKind, LambdaExpr, LetStatement, LetTarget, UnaryOp, VarName};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::{ensure_sufficient_stack, Span, SyntaxError, SyntaxErrorKind};

#[cfg(test)]
mod tests;

/// Parse exactly one expression; anything left over is an error.
pub fn parse_expression(source: &str) -> Result<Expr, SyntaxError> {
    let mut parser = Parser::new(source)?;
    let expr = parser.expr()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse a whitespace-separated sequence of expressions (`:echo a b`).
pub fn parse_expression_list(source: &str) -> Result<Vec<Expr>, SyntaxError> {
    let mut parser = Parser::new(source)?;
    let mut exprs = Vec::new();
    while !parser.at_end() {
        exprs.push(parser.expr()?);
    }
    Ok(exprs)
}

/// Parse the argument of `:let`.
pub fn parse_let(source: &str) -> Result<LetStatement, SyntaxError> {
    let mut parser = Parser::new(source)?;
    let target = if parser.eat(&TokenKind::LBracket) {
        parser.unpack_target()?
    } else {
        LetTarget::Single(parser.target()?)
    };
    let op = match parser.peek_kind() {
        Some(TokenKind::Assign(op)) => *op,
        _ => return Err(parser.error_here()),
    };
    parser.bump();
    let value = parser.expr()?;
    parser.expect_end()?;
    Ok(LetStatement { target, op, value })
}

/// Parse whitespace-separated assignable names (`:unlet a b[0] d.k`).
pub fn parse_targets(source: &str) -> Result<Vec<Expr>, SyntaxError> {
    let mut parser = Parser::new(source)?;
    let mut targets = Vec::new();
    while !parser.at_end() {
        targets.push(parser.target()?);
    }
    Ok(targets)
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Result<Self, SyntaxError> {
        let tokens = tokenize(source)?;
        tracing::trace!(count = tokens.len(), "tokenized expression");
        Ok(Parser {
            source,
            tokens,
            pos: 0,
        })
    }

    // --- cursor helpers ---

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn peek_nth_kind(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, missing: SyntaxErrorKind) -> Result<Span, SyntaxError> {
        match self.peek() {
            Some(token) if &token.kind == kind => {
                let span = token.span;
                self.pos += 1;
                Ok(span)
            }
            Some(token) => Err(SyntaxError::new(missing, token.span)),
            None => Err(SyntaxError::new(missing, self.end_span())),
        }
    }

    fn expect_end(&self) -> Result<(), SyntaxError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => {
                let rest = self.source.get(token.span.start as usize..).unwrap_or("");
                Err(SyntaxError::trailing(rest, token.span))
            }
        }
    }

    /// Span of the previous token; `Span::DUMMY` before the first one.
    fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(Span::DUMMY, |t| t.span)
    }

    fn end_span(&self) -> Span {
        let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
        Span::new(end, end)
    }

    /// True when the next token starts right where the previous one ended.
    fn next_touches(&self) -> bool {
        self.peek()
            .is_some_and(|t| self.prev_span().touches(t.span))
    }

    #[cold]
    fn error_here(&self) -> SyntaxError {
        let span = self.peek().map_or_else(|| self.end_span(), |t| t.span);
        SyntaxError::invalid_expression(self.source, span)
    }

    // --- expressions ---

    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        ensure_sufficient_stack(|| self.ternary())
    }

    /// expr1: `a ? b : c` and `a ?? b`
    fn ternary(&mut self) -> Result<Expr, SyntaxError> {
        let cond = self.binary(1)?;
        if self.eat(&TokenKind::Question) {
            let then = self.expr()?;
            let missing = SyntaxErrorKind::InvalidExpression(self.source.trim().to_string());
            self.expect(&TokenKind::Colon, missing)?;
            let otherwise = self.expr()?;
            let span = cond.span.merge(otherwise.span);
            return Ok(Expr::new(
                ExprKind::Ternary {
                    cond: Box::new(cond),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                },
                span,
            ));
        }
        if self.eat(&TokenKind::QuestionQuestion) {
            let right = self.expr()?;
            let span = cond.span.merge(right.span);
            return Ok(Expr::new(
                ExprKind::Coalesce {
                    left: Box::new(cond),
                    right: Box::new(right),
                },
                span,
            ));
        }
        Ok(cond)
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        match self.peek_kind()? {
            TokenKind::PipePipe => Some(BinaryOp::Or),
            TokenKind::AmpAmp => Some(BinaryOp::And),
            TokenKind::Compare(op) => Some(*op),
            TokenKind::Shl => Some(BinaryOp::Shl),
            TokenKind::Shr => Some(BinaryOp::Shr),
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Dot => Some(BinaryOp::Concat),
            TokenKind::DotDot => Some(BinaryOp::DotDot),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Mod),
            _ => None,
        }
    }

    fn binary(&mut self, min_prec: u8) -> Result<Expr, SyntaxError> {
        let mut left = self.unary()?;
        let mut compared = false;
        while let Some(op) = self.binary_op() {
            let prec = op.precedence();
            if prec < min_prec || (prec == 3 && compared) {
                break;
            }
            self.bump();
            let right = self.binary(prec + 1)?;
            compared |= prec == 3;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.peek_kind() {
            Some(TokenKind::Bang) => UnaryOp::Not,
            Some(TokenKind::Minus) => UnaryOp::Neg,
            Some(TokenKind::Plus) => UnaryOp::Plus,
            _ => return self.postfix(),
        };
        let start = self.bump().map_or(Span::DUMMY, |t| t.span);
        let operand = self.unary()?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.primary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::LBracket) if self.next_touches() => {
                    self.bump();
                    expr = self.index_or_slice(expr)?;
                }
                Some(TokenKind::LParen) if self.next_touches() => {
                    self.bump();
                    let args = self.arguments()?;
                    let span = expr.span.merge(self.prev_span());
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                Some(TokenKind::Dot) if self.is_member_access() => {
                    self.bump();
                    let key = match self.bump().map(|t| t.kind) {
                        Some(TokenKind::Name(name)) => name,
                        Some(TokenKind::Number(n)) => n.to_string().into(),
                        _ => return Err(self.error_here()),
                    };
                    let span = expr.span.merge(self.prev_span());
                    expr = Expr::new(
                        ExprKind::Member {
                            base: Box::new(expr),
                            key,
                        },
                        span,
                    );
                }
                Some(TokenKind::Arrow) => {
                    self.bump();
                    expr = self.method_call(expr)?;
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `d.key` needs the dot glued to both neighbours; `a . b` is concatenation.
    fn is_member_access(&self) -> bool {
        let Some(dot) = self.peek() else {
            return false;
        };
        let Some(key) = self.tokens.get(self.pos + 1) else {
            return false;
        };
        self.prev_span().touches(dot.span)
            && dot.span.touches(key.span)
            && matches!(key.kind, TokenKind::Name(_) | TokenKind::Number(_))
    }

    fn index_or_slice(&mut self, base: Expr) -> Result<Expr, SyntaxError> {
        let start = if self.peek_kind() == Some(&TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.expr()?))
        };
        if self.eat(&TokenKind::Colon) {
            let end = if self.peek_kind() == Some(&TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.expr()?))
            };
            let close = self.expect(&TokenKind::RBracket, SyntaxErrorKind::MissingBracket)?;
            let span = base.span.merge(close);
            return Ok(Expr::new(
                ExprKind::Slice {
                    base: Box::new(base),
                    start,
                    end,
                },
                span,
            ));
        }
        let close = self.expect(&TokenKind::RBracket, SyntaxErrorKind::MissingBracket)?;
        let Some(index) = start else {
            return Err(self.error_here());
        };
        let span = base.span.merge(close);
        Ok(Expr::new(
            ExprKind::Index {
                base: Box::new(base),
                index,
            },
            span,
        ))
    }

    /// Comma-separated arguments after `(`, through the closing `)`.
    fn arguments(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RParen, SyntaxErrorKind::MissingParen)?;
            return Ok(args);
        }
    }

    /// After `->`: `name(args)` or `{lambda}(args)`.
    fn method_call(&mut self, receiver: Expr) -> Result<Expr, SyntaxError> {
        let callee = match self.peek().cloned() {
            Some(Token {
                kind: TokenKind::Name(name),
                span,
            }) => {
                self.bump();
                Expr::new(ExprKind::Variable(VarName::new(None, name)), span)
            }
            Some(Token {
                kind: TokenKind::Scoped(scope, name),
                span,
            }) => {
                self.bump();
                Expr::new(ExprKind::Variable(VarName::new(Some(scope), name)), span)
            }
            Some(Token {
                kind: TokenKind::LBrace,
                span,
            }) => {
                self.bump();
                self.lambda(span)?
            }
            _ => return Err(self.error_here()),
        };
        if !(self.next_touches() && self.eat(&TokenKind::LParen)) {
            return Err(self.error_here());
        }
        let args = self.arguments()?;
        let span = receiver.span.merge(self.prev_span());
        Ok(Expr::new(
            ExprKind::MethodCall {
                receiver: Box::new(receiver),
                callee: Box::new(callee),
                args,
            },
            span,
        ))
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        let Some(token) = self.bump() else {
            return Err(self.error_here());
        };
        let span = token.span;
        let kind = match token.kind {
            TokenKind::Number(n) => ExprKind::Number(n),
            TokenKind::Float(f) => ExprKind::Float(f),
            TokenKind::String(s) => ExprKind::String(s),
            TokenKind::Blob(b) => ExprKind::Blob(b),
            TokenKind::Name(name) => ExprKind::Variable(VarName::new(None, name)),
            TokenKind::Scoped(scope, name) => ExprKind::Variable(VarName::new(Some(scope), name)),
            TokenKind::Option(name) => ExprKind::Option(name),
            TokenKind::Env(name) => ExprKind::Env(name),
            TokenKind::LParen => {
                let inner = self.expr()?;
                let close = self.expect(&TokenKind::RParen, SyntaxErrorKind::MissingParen)?;
                return Ok(Expr::new(inner.kind, span.merge(close)));
            }
            TokenKind::LBracket => return self.list_literal(span),
            TokenKind::LBrace => {
                if self.is_lambda_start() {
                    return self.lambda(span);
                }
                return self.dict_literal(span);
            }
            TokenKind::HashBrace => return self.literal_dict(span),
            _ => {
                self.pos -= 1;
                return Err(self.error_here());
            }
        };
        Ok(Expr::new(kind, span))
    }

    fn list_literal(&mut self, open: Span) -> Result<Expr, SyntaxError> {
        let mut items = Vec::new();
        loop {
            if self.eat(&TokenKind::RBracket) {
                break;
            }
            items.push(self.expr()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RBracket, SyntaxErrorKind::MissingListEnd)?;
            break;
        }
        Ok(Expr::new(ExprKind::List(items), open.merge(self.prev_span())))
    }

    fn dict_literal(&mut self, open: Span) -> Result<Expr, SyntaxError> {
        let mut entries = Vec::new();
        loop {
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            let key = self.expr()?;
            self.expect(&TokenKind::Colon, SyntaxErrorKind::MissingColon)?;
            let value = self.expr()?;
            entries.push((key, value));
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RBrace, SyntaxErrorKind::MissingDictEnd)?;
            break;
        }
        Ok(Expr::new(ExprKind::Dict(entries), open.merge(self.prev_span())))
    }

    /// `#{key: value}` with bare-word keys.
    fn literal_dict(&mut self, open: Span) -> Result<Expr, SyntaxError> {
        let mut entries = Vec::new();
        loop {
            if self.eat(&TokenKind::RBrace) {
                break;
            }
            let Some(token) = self.bump() else {
                return Err(SyntaxError::new(SyntaxErrorKind::MissingDictEnd, self.end_span()));
            };
            // `#{a: 1}` lexes `a:` as a scope prefix; treat it as key plus colon.
            let (key, colon_seen): (Rc<str>, bool) = match token.kind {
                TokenKind::Name(name) => (name, false),
                TokenKind::Number(n) => (n.to_string().into(), false),
                TokenKind::String(s) => (s, false),
                TokenKind::Scoped(_, ref name) if name.is_empty() => {
                    (token.span.slice(self.source).trim_end_matches(':').into(), true)
                }
                _ => return Err(SyntaxError::invalid_expression(self.source, token.span)),
            };
            if !colon_seen {
                self.expect(&TokenKind::Colon, SyntaxErrorKind::MissingColon)?;
            }
            let value = self.expr()?;
            entries.push((Expr::new(ExprKind::String(key), token.span), value));
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RBrace, SyntaxErrorKind::MissingDictEnd)?;
            break;
        }
        Ok(Expr::new(ExprKind::Dict(entries), open.merge(self.prev_span())))
    }

    /// After `{`: `->` directly, or `name, name ->`.
    fn is_lambda_start(&self) -> bool {
        let mut n = 0;
        loop {
            match self.peek_nth_kind(n) {
                Some(TokenKind::Arrow) => return true,
                Some(TokenKind::Name(_)) => match self.peek_nth_kind(n + 1) {
                    Some(TokenKind::Comma) => n += 2,
                    Some(TokenKind::Arrow) => return true,
                    _ => return false,
                },
                _ => return false,
            }
        }
    }

    fn lambda(&mut self, open: Span) -> Result<Expr, SyntaxError> {
        let mut params = Vec::new();
        while let Some(TokenKind::Name(name)) = self.peek_kind().cloned() {
            self.bump();
            params.push(name);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        if !self.eat(&TokenKind::Arrow) {
            return Err(self.error_here());
        }
        let body = self.expr()?;
        let close = self.expect(&TokenKind::RBrace, SyntaxErrorKind::MissingDictEnd)?;
        Ok(Expr::new(
            ExprKind::Lambda(Rc::new(LambdaExpr { params, body })),
            open.merge(close),
        ))
    }

    // --- assignment targets ---

    fn target(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.postfix()?;
        if expr.kind.is_assignable() {
            Ok(expr)
        } else {
            let text = expr.span.slice(self.source).to_string();
            Err(SyntaxError::new(SyntaxErrorKind::InvalidTarget(text), expr.span))
        }
    }

    /// `[a, b; rest]` after the opening bracket.
    fn unpack_target(&mut self) -> Result<LetTarget, SyntaxError> {
        let mut items = Vec::new();
        let mut rest = None;
        loop {
            items.push(self.target()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            if self.eat(&TokenKind::Semicolon) {
                rest = Some(self.target()?);
            }
            self.expect(&TokenKind::RBracket, SyntaxErrorKind::MissingListEnd)?;
            break;
        }
        Ok(LetTarget::Unpack { items, rest })
    }
}
