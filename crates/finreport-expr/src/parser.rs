//! Recursive-descent expression parser.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expression     = additive
//! additive       = multiplicative (("+" | "-") multiplicative)*
//! multiplicative = unary (("*" | "/") unary)*
//! unary          = ("+" | "-") unary | primary
//! primary        = NUMBER | IDENT | ORDER_REF | "(" expression ")"
//! ```
//!
//! Binary operators are left-associative. Unary signs stack (`--10` is `10`).
//!
//! Parentheses, signs and chained binary operators each add a level to the
//! tree; more than [`MAX_DEPTH`] levels fail with
//! [`SyntaxErrorKind::TooDeep`].

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::lexer::{tokenize, Span, Token};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Deepest expression tree the parser builds.
pub const MAX_DEPTH: usize = 256;

/// Parse an expression without caching.
///
/// Lexical errors are reported before any grammar error, so an invalid
/// character is always named even when it appears after another problem.
pub fn parse(source: &str) -> Result<Expr, SyntaxError> {
    let tokens = tokenize(source);

    if let Some((_, span)) = tokens.iter().find(|(t, _)| *t == Token::Error) {
        let text = source.get(span.start..span.end).unwrap_or_default();
        return Err(SyntaxError::new(
            SyntaxErrorKind::InvalidCharacter(text.to_string()),
            *span,
        ));
    }

    if tokens.is_empty() {
        return Err(SyntaxError::new(
            SyntaxErrorKind::Empty,
            Span::new(0, source.len()),
        ));
    }

    let mut parser = Parser::new(&tokens, source.len());
    let expr = parser.parse_expression()?;

    match parser.peek() {
        None => Ok(expr),
        Some((Token::RParen, span)) => Err(SyntaxError::new(
            SyntaxErrorKind::UnmatchedClosingParen,
            span,
        )),
        Some((token, span)) => Err(SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken(token.to_string()),
            span,
        )),
    }
}

struct Parser<'t, 'src> {
    tokens: &'t [(Token<'src>, Span)],
    pos: usize,
    end: usize,
    depth: usize,
}

impl<'t, 'src> Parser<'t, 'src> {
    const fn new(tokens: &'t [(Token<'src>, Span)], end: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<(Token<'src>, Span)> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    const fn eof_span(&self) -> Span {
        Span::new(self.end, self.end)
    }

    /// Enter one more tree level; the caller leaves it by decrementing `depth`.
    fn descend(&mut self, span: Span) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(SyntaxError::new(SyntaxErrorKind::TooDeep, span));
        }
        Ok(())
    }

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_multiplicative()?;
        let mut chained = 0;

        loop {
            let (op, span) = match self.peek() {
                Some((Token::Plus, span)) => (BinaryOp::Add, span),
                Some((Token::Minus, span)) => (BinaryOp::Sub, span),
                _ => break,
            };

            self.advance();
            self.descend(span)?;
            chained += 1;
            let right = self.parse_multiplicative()?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth -= chained;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;
        let mut chained = 0;

        loop {
            let (op, span) = match self.peek() {
                Some((Token::Star, span)) => (BinaryOp::Mul, span),
                Some((Token::Slash, span)) => (BinaryOp::Div, span),
                _ => break,
            };

            self.advance();
            self.descend(span)?;
            chained += 1;
            let right = self.parse_unary()?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth -= chained;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let (op, span) = match self.peek() {
            Some((Token::Plus, span)) => (UnaryOp::Plus, span),
            Some((Token::Minus, span)) => (UnaryOp::Minus, span),
            _ => return self.parse_primary(),
        };

        self.advance();
        self.descend(span)?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let Some((token, span)) = self.peek() else {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedEnd,
                self.eof_span(),
            ));
        };

        match token {
            Token::Number(text) => {
                self.advance();
                Decimal::from_str(text).map(Expr::Number).map_err(|_| {
                    SyntaxError::new(SyntaxErrorKind::InvalidNumber(text.to_string()), span)
                })
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Expr::Variable(name.to_string()))
            }
            Token::OrderRef(name) => {
                self.advance();
                Ok(Expr::Order(name.to_string()))
            }
            Token::LParen => {
                self.advance();
                self.descend(span)?;
                let inner = self.parse_expression()?;
                self.depth -= 1;
                match self.peek() {
                    Some((Token::RParen, _)) => {
                        self.advance();
                        Ok(inner)
                    }
                    Some((other, other_span)) => Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedToken(other.to_string()),
                        other_span,
                    )),
                    None => Err(SyntaxError::new(
                        SyntaxErrorKind::MissingClosingParen,
                        span,
                    )),
                }
            }
            Token::RParen if !self.inside_parens() => Err(SyntaxError::new(
                SyntaxErrorKind::UnmatchedClosingParen,
                span,
            )),
            other => Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedToken(other.to_string()),
                span,
            )),
        }
    }

    /// Whether the cursor is nested inside an open parenthesis.
    fn inside_parens(&self) -> bool {
        let mut depth = 0i32;
        for (token, _) in &self.tokens[..self.pos] {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
        }
        depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kind(source: &str) -> SyntaxErrorKind {
        parse(source).unwrap_err().kind
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(parse("1 + 2 * 3").unwrap().to_string(), "(1 + (2 * 3))");
        assert_eq!(parse("8 - 4 - 2").unwrap().to_string(), "((8 - 4) - 2)");
        assert_eq!(parse("8 / 4 / 2").unwrap().to_string(), "((8 / 4) / 2)");
        assert_eq!(parse("(1 + 2) * 3").unwrap().to_string(), "((1 + 2) * 3)");
    }

    #[test]
    fn test_unary_binds_tighter_and_stacks() {
        assert_eq!(parse("-a * b").unwrap().to_string(), "(-a * b)");
        assert_eq!(parse("--10").unwrap().to_string(), "--10");
        assert_eq!(parse("5 - -3").unwrap().to_string(), "(5 - -3)");
    }

    #[test]
    fn test_primary_kinds() {
        assert_eq!(parse("12.50").unwrap(), Expr::Number(dec!(12.50)));
        assert_eq!(parse("revenue").unwrap(), Expr::Variable("revenue".into()));
        assert_eq!(parse("@30").unwrap(), Expr::Order("@30".into()));
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(kind(""), SyntaxErrorKind::Empty);
        assert_eq!(kind("   "), SyntaxErrorKind::Empty);
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(kind("a % b"), SyntaxErrorKind::InvalidCharacter("%".into()));
        let err = parse("1 + 2 & 3").unwrap_err();
        assert_eq!(err.span, Span::new(6, 7));
    }

    #[test]
    fn test_leading_binary_operator() {
        assert_eq!(kind("* 5"), SyntaxErrorKind::UnexpectedToken("*".into()));
    }

    #[test]
    fn test_trailing_operator() {
        assert_eq!(kind("5 +"), SyntaxErrorKind::UnexpectedEnd);
    }

    #[test]
    fn test_doubled_binary_operator() {
        assert_eq!(kind("5 * / 2"), SyntaxErrorKind::UnexpectedToken("/".into()));
    }

    #[test]
    fn test_parenthesis_errors() {
        assert_eq!(kind("(1 + 2"), SyntaxErrorKind::MissingClosingParen);
        assert_eq!(kind("1 + 2)"), SyntaxErrorKind::UnmatchedClosingParen);
        assert_eq!(kind(")"), SyntaxErrorKind::UnmatchedClosingParen);
        assert_eq!(kind("()"), SyntaxErrorKind::UnexpectedToken(")".into()));
        assert_eq!(kind("(1 2)"), SyntaxErrorKind::UnexpectedToken("2".into()));
    }

    #[test]
    fn test_adjacent_operands() {
        assert_eq!(kind("5 5"), SyntaxErrorKind::UnexpectedToken("5".into()));
        assert_eq!(kind("a (b)"), SyntaxErrorKind::UnexpectedToken("(".into()));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert!(parse(&nested(MAX_DEPTH)).is_ok());
        assert_eq!(kind(&nested(MAX_DEPTH + 1)), SyntaxErrorKind::TooDeep);

        let err = parse(&nested(20_000)).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::TooDeep);
        assert_eq!(err.span, Span::new(MAX_DEPTH, MAX_DEPTH + 1));

        assert!(parse(&format!("{}1", "-".repeat(MAX_DEPTH))).is_ok());
        assert_eq!(kind(&"-".repeat(20_000)), SyntaxErrorKind::TooDeep);
    }

    #[test]
    fn test_chained_operators_count_towards_the_limit() {
        let chain = |n: usize| vec!["1"; n + 1].join(" + ");
        assert!(parse(&chain(MAX_DEPTH)).is_ok());
        assert_eq!(kind(&chain(20_000)), SyntaxErrorKind::TooDeep);
        assert_eq!(kind(&vec!["2"; 20_000].join("*")), SyntaxErrorKind::TooDeep);

        let groups = vec!["(1 + 1)"; 2 * MAX_DEPTH].join(" * ");
        assert_eq!(kind(&groups), SyntaxErrorKind::TooDeep);

        // Levels are released when a group closes.
        let siblings = format!("{0} + {0}", "(".repeat(200) + "1" + &")".repeat(200));
        assert!(parse(&siblings).is_ok());
    }

    #[test]
    fn test_number_out_of_range() {
        let huge = "9".repeat(40);
        assert_eq!(kind(&huge), SyntaxErrorKind::InvalidNumber(huge.clone()));
    }
}
