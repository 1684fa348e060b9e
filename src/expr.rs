//! Boolean expressions: parsing, printing, simplification, and conversion to and from circuits
//!
//! The grammar uses the usual precedence, from lowest to highest: Or/Nor, Xor, And/Nand, Not.
//! Operators may be written as keywords in any case (`AND`, `or`, `Not`, ...) or as symbols:
//!
//! | Operator | Spellings |
//! |----------|-----------|
//! | And      | `AND` `·` `∧` `*` |
//! | Or       | `OR` `+` `∨` |
//! | Not      | `NOT` `¬` `!` `'` |
//! | Xor      | `XOR` `⊕` |
//! | Nand     | `NAND` `⊼` |
//! | Nor      | `NOR` `⊽` |
//!
//! A keyword immediately followed by a letter or digit is part of a variable name: `ORB` is a
//! variable. Variable names are upper-cased.
//!
//! ```
//! use boolsim::expr::{parse_to_circuit, simplify_expression};
//! assert_eq!(simplify_expression("NOT NOT A").unwrap(), "A");
//! assert_eq!(simplify_expression("A XOR A").unwrap(), "0");
//!
//! let circuit = parse_to_circuit("A AND B").unwrap();
//! assert_eq!(circuit.gates().len(), 1);
//! ```

mod ast;
mod extract;
mod parser;
mod synth;
pub mod token;

use crate::error::ParseError;

pub use ast::{BinaryOp, Expr};
pub use extract::{circuit_expression, circuit_expressions, circuit_to_expr};
pub use parser::parse;
pub use synth::{expr_to_circuit, parse_to_circuit};
pub use token::{tokenize, Token, TokenType};

/// Parse, simplify and print an expression
pub fn simplify_expression(text: &str) -> Result<String, ParseError> {
    Ok(parse(text)?.simplify().to_string())
}

/// Output column of the truth table of an expression
///
/// Rows enumerate the variables in binary, the first variable being the most significant bit.
/// Variables of the expression missing from the list read as false.
pub fn truth_table(text: &str, variables: &[String]) -> Result<Vec<bool>, ParseError> {
    Ok(parse(text)?.truth_table(variables))
}

#[cfg(test)]
mod tests {
    use super::{simplify_expression, truth_table};
    use crate::error::ParseError;

    #[test]
    fn test_simplify_expression() {
        assert_eq!(simplify_expression("NOT NOT A").unwrap(), "A");
        assert_eq!(simplify_expression("A XOR A").unwrap(), "0");
        assert_eq!(simplify_expression("(A AND B) OR (A AND B)").unwrap(), "(A AND B)");
        assert_eq!(simplify_expression("!!!A").unwrap(), "NOT A");
        assert_eq!(simplify_expression("A AND"), Err(ParseError::UnexpectedEnd));
    }

    #[test]
    fn test_simplify_idempotent() {
        for text in [
            "NOT NOT A",
            "A XOR A",
            "NOT (NOT A AND NOT A)",
            "(A OR A) XOR (A OR A)",
            "NOT NOT (B NAND B) OR C",
        ] {
            let once = simplify_expression(text).unwrap();
            assert_eq!(simplify_expression(&once).unwrap(), once, "{text}");
        }
    }

    #[test]
    fn test_truth_table() {
        let vars = vec!["A".to_string(), "B".to_string()];
        assert_eq!(
            truth_table("A AND B", &vars).unwrap(),
            vec![false, false, false, true]
        );
        assert_eq!(
            truth_table("A XOR B", &vars).unwrap(),
            vec![false, true, true, false]
        );
        assert_eq!(
            truth_table("NOT C", &vars).unwrap(),
            vec![true, true, true, true]
        );
    }
}
