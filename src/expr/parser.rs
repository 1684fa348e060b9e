//! Recursive descent parser for boolean expressions
//!
//! Precedence, from lowest to highest: Or/Nor, Xor, And/Nand, Not.
//! Binary operators are left-associative and Not is right-associative.

use crate::error::ParseError;
use crate::expr::ast::{BinaryOp, Expr};
use crate::expr::token::{tokenize, Token, TokenType};

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    /// Consume the next token if it has one of the given types
    fn matches(&mut self, kinds: &[TokenType]) -> Option<TokenType> {
        let kind = self.peek()?.kind;
        if kinds.contains(&kind) {
            self.current += 1;
            Some(kind)
        } else {
            None
        }
    }

    fn binary_op(kind: TokenType) -> BinaryOp {
        match kind {
            TokenType::Or => BinaryOp::Or,
            TokenType::Nor => BinaryOp::Nor,
            TokenType::Xor => BinaryOp::Xor,
            TokenType::And => BinaryOp::And,
            TokenType::Nand => BinaryOp::Nand,
            _ => unreachable!("{kind:?} is not a binary operator"),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_xor()?;
        while let Some(kind) = self.matches(&[TokenType::Or, TokenType::Nor]) {
            let right = self.parse_xor()?;
            left = Expr::binary(Parser::binary_op(kind), left, right);
        }
        Ok(left)
    }

    fn parse_xor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while let Some(kind) = self.matches(&[TokenType::Xor]) {
            let right = self.parse_and()?;
            left = Expr::binary(Parser::binary_op(kind), left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;
        while let Some(kind) = self.matches(&[TokenType::And, TokenType::Nand]) {
            let right = self.parse_not()?;
            left = Expr::binary(Parser::binary_op(kind), left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[TokenType::Not]).is_some() {
            Ok(Expr::not(self.parse_not()?))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.peek().cloned() else {
            return Err(ParseError::UnexpectedEnd);
        };
        self.current += 1;
        match token.kind {
            TokenType::Variable => Ok(Expr::Variable(token.text)),
            TokenType::Constant => Ok(Expr::Constant(token.text == "1")),
            TokenType::LParen => {
                let e = self.parse_or()?;
                if self.matches(&[TokenType::RParen]).is_none() {
                    let found = self
                        .peek()
                        .map(|t| t.text.clone())
                        .unwrap_or_else(|| "end of expression".to_string());
                    return Err(ParseError::MissingParen(found));
                }
                Ok(e)
            }
            _ => Err(ParseError::UnexpectedToken(token.text)),
        }
    }
}

/// Parse an expression
///
/// ```
/// use boolsim::expr::parse;
/// let e = parse("(A OR B) AND NOT C").unwrap();
/// assert_eq!(e.to_string(), "((A OR B) AND NOT C)");
/// assert_eq!(e.variables(), vec!["A", "B", "C"]);
/// ```
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(text)?,
        current: 0,
    };
    let e = parser.parse_or()?;
    match parser.peek() {
        Some(token) => Err(ParseError::TrailingInput(token.text.clone())),
        None => Ok(e),
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::error::{LexError, ParseError};
    use crate::expr::ast::{BinaryOp, Expr};

    #[test]
    fn test_precedence() {
        let a = || Expr::var("A");
        let b = || Expr::var("B");
        let c = || Expr::var("C");
        assert_eq!(
            parse("A OR B AND C").unwrap(),
            Expr::or(a(), Expr::and(b(), c()))
        );
        assert_eq!(
            parse("A XOR B OR C").unwrap(),
            Expr::or(Expr::xor(a(), b()), c())
        );
        assert_eq!(
            parse("A AND B XOR C").unwrap(),
            Expr::xor(Expr::and(a(), b()), c())
        );
        assert_eq!(
            parse("NOT A AND B").unwrap(),
            Expr::and(Expr::not(a()), b())
        );
        assert_eq!(
            parse("A NAND B NOR C").unwrap(),
            Expr::binary(
                BinaryOp::Nor,
                Expr::binary(BinaryOp::Nand, a(), b()),
                c()
            )
        );
    }

    #[test]
    fn test_associativity() {
        let a = || Expr::var("A");
        let b = || Expr::var("B");
        let c = || Expr::var("C");
        assert_eq!(
            parse("A AND B AND C").unwrap(),
            Expr::and(Expr::and(a(), b()), c())
        );
        assert_eq!(
            parse("A AND (B AND C)").unwrap(),
            Expr::and(a(), Expr::and(b(), c()))
        );
        assert_eq!(parse("!!A").unwrap(), Expr::not(Expr::not(a())));
    }

    #[test]
    fn test_constants() {
        assert_eq!(parse("0").unwrap(), Expr::Constant(false));
        assert_eq!(
            parse("A + 1").unwrap(),
            Expr::or(Expr::var("A"), Expr::Constant(true))
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(""), Err(ParseError::UnexpectedEnd));
        assert_eq!(parse("A AND"), Err(ParseError::UnexpectedEnd));
        assert_eq!(
            parse("(A OR B"),
            Err(ParseError::MissingParen("end of expression".to_string()))
        );
        assert_eq!(
            parse("A B"),
            Err(ParseError::TrailingInput("B".to_string()))
        );
        assert_eq!(
            parse("A AND OR B"),
            Err(ParseError::UnexpectedToken("OR".to_string()))
        );
        assert_eq!(
            parse("A)"),
            Err(ParseError::TrailingInput(")".to_string()))
        );
        assert_eq!(
            parse("A ? B"),
            Err(ParseError::Lex(LexError {
                character: '?',
                position: 2
            }))
        );
    }

    #[test]
    fn test_round_trip() {
        for text in [
            "A AND B",
            "(A OR B) AND NOT C",
            "NOT (A NAND B) NOR (C XOR D)",
            "NOT NOT A",
            "A XOR 1",
        ] {
            let e = parse(text).unwrap();
            assert_eq!(parse(&e.to_string()).unwrap(), e, "{text}");
        }
    }
}
