//! Error types

use thiserror::Error;

use crate::circuit::ComponentId;

/// Character that cannot start any token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid character in expression: {character} (position {position})")]
pub struct LexError {
    /// Offending character
    pub character: char,
    /// Position of the character, counted in characters
    pub position: usize,
}

/// Expression that does not follow the grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text could not be split into tokens
    #[error(transparent)]
    Lex(#[from] LexError),
    /// A token appeared where an operand was expected
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),
    /// A parenthesis was opened but not closed
    #[error("Expected ')' but found {0}")]
    MissingParen(String),
    /// The expression stopped where an operand was expected
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    /// Tokens remain after a complete expression
    #[error("Unexpected token after expression: {0}")]
    TrailingInput(String),
}

/// Failure to build a circuit from an expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// The expression could not be parsed
    #[error("Invalid expression: {0}")]
    InvalidExpression(#[from] ParseError),
}

/// Rejected connection; the circuit is left unchanged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// An endpoint does not exist
    #[error("Unknown component {0}")]
    UnknownComponent(ComponentId),
    /// Both endpoints are the same component
    #[error("Cannot connect {0} to itself")]
    SelfLoop(ComponentId),
    /// Connections must go from an output port to an input port
    #[error("Connections must go from an output port to an input port")]
    WrongPortTypes,
    /// The input slot does not exist on the target
    #[error("{component} has {arity} inputs, slot {slot} does not exist")]
    SlotOutOfRange {
        /// Target component
        component: ComponentId,
        /// Requested slot
        slot: usize,
        /// Number of slots of the target
        arity: usize,
    },
    /// The connection would close a feedback loop
    #[error("Connecting {from} to {to} would create a cycle")]
    WouldCreateCycle {
        /// Driving component
        from: ComponentId,
        /// Receiving component
        to: ComponentId,
    },
}

/// Failure to load a circuit document
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Malformed JSON or missing fields
    #[error("Malformed circuit document: {0}")]
    Json(#[from] serde_json::Error),
    /// Read or write failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Unknown component type or subtype
    #[error("Unknown component type {category}/{subtype}")]
    UnknownComponent {
        /// Component category (gate, input, output)
        category: String,
        /// Component subtype
        subtype: String,
    },
    /// Two components share the same id
    #[error("Component id {0} is used twice")]
    DuplicateId(ComponentId),
    /// The connections of the document form a cycle (strict loading only)
    #[error("Connections form a cycle through {0}")]
    Cycle(ComponentId),
}

/// Failure to read a .bench file
#[derive(Debug, Error)]
pub enum BenchError {
    /// Read or write failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Malformed statement
    #[error("Line {line}: {message}")]
    Syntax {
        /// Line number, starting at 1
        line: usize,
        /// Description of the problem
        message: String,
    },
    /// Gate type with no component counterpart
    #[error("Unsupported gate {0}")]
    UnsupportedGate(String),
    /// Signal used but never defined
    #[error("Signal {0} is not defined")]
    UndefinedSignal(String),
    /// Signal defined twice
    #[error("Signal {0} is defined twice")]
    Redefined(String),
    /// The netlist could not be connected
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Any error of the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Expression parsing error
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Expression to circuit error
    #[error(transparent)]
    Expr(#[from] ExprError),
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    /// Document error
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// Bench file error
    #[error(transparent)]
    Bench(#[from] BenchError),
    /// Read or write failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Unsupported request
    #[error("{0}")]
    Unsupported(String),
}
