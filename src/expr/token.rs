//! Splitting of expression text into tokens

use std::fmt;

use crate::error::LexError;

/// Kind of token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Variable name
    Variable,
    /// Constant 0 or 1
    Constant,
    /// And operator
    And,
    /// Or operator
    Or,
    /// Not operator
    Not,
    /// Xor operator
    Xor,
    /// Nand operator
    Nand,
    /// Nor operator
    Nor,
    /// Opening parenthesis
    LParen,
    /// Closing parenthesis
    RParen,
}

/// A token with its text and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Kind of token
    pub kind: TokenType,
    /// Text of the token; operators are normalized to their uppercase keyword
    pub text: String,
    /// Position of the first character, counted in characters
    pub position: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Keywords, longest first so that NAND and NOR are not read as a prefix
const KEYWORDS: [(&str, TokenType); 6] = [
    ("NAND", TokenType::Nand),
    ("NOR", TokenType::Nor),
    ("AND", TokenType::And),
    ("XOR", TokenType::Xor),
    ("NOT", TokenType::Not),
    ("OR", TokenType::Or),
];

fn symbol(c: char) -> Option<TokenType> {
    use TokenType::*;
    match c {
        '(' => Some(LParen),
        ')' => Some(RParen),
        '·' | '∧' | '*' => Some(And),
        '+' | '∨' => Some(Or),
        '\'' | '¬' | '!' => Some(Not),
        '⊕' => Some(Xor),
        '⊼' => Some(Nand),
        '⊽' => Some(Nor),
        _ => None,
    }
}

fn keyword_text(kind: TokenType) -> &'static str {
    use TokenType::*;
    match kind {
        And => "AND",
        Or => "OR",
        Not => "NOT",
        Xor => "XOR",
        Nand => "NAND",
        Nor => "NOR",
        LParen => "(",
        RParen => ")",
        Variable | Constant => "",
    }
}

/// Match a keyword at the start of the slice, unless it runs into an identifier
fn keyword(chars: &[char]) -> Option<(TokenType, usize)> {
    KEYWORDS.iter().find_map(|(kw, kind)| {
        let len = kw.len();
        if chars.len() < len {
            return None;
        }
        let matches = chars[..len]
            .iter()
            .zip(kw.chars())
            .all(|(c, k)| c.eq_ignore_ascii_case(&k));
        let boundary = chars.get(len).map_or(true, |c| !c.is_ascii_alphanumeric());
        (matches && boundary).then_some((*kind, len))
    })
}

/// Split an expression into tokens
///
/// Variable names are upper-cased, so `a AND b` and `A AND B` are the same expression.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = text.chars().collect();
    let mut ret = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if let Some((kind, len)) = keyword(&chars[i..]) {
            ret.push(Token {
                kind,
                text: keyword_text(kind).to_string(),
                position: i,
            });
            i += len;
        } else if let Some(kind) = symbol(c) {
            ret.push(Token {
                kind,
                text: keyword_text(kind).to_string(),
                position: i,
            });
            i += 1;
        } else if c == '0' || c == '1' {
            ret.push(Token {
                kind: TokenType::Constant,
                text: c.to_string(),
                position: i,
            });
            i += 1;
        } else if c.is_ascii_alphabetic() {
            let len = chars[i..]
                .iter()
                .take_while(|c| c.is_ascii_alphanumeric())
                .count();
            ret.push(Token {
                kind: TokenType::Variable,
                text: chars[i..i + len].iter().collect::<String>().to_ascii_uppercase(),
                position: i,
            });
            i += len;
        } else {
            return Err(LexError {
                character: c,
                position: i,
            });
        }
    }
    Ok(ret)
}
