//! Boolean logic circuits: simulation, expressions and truth tables
//!
//! This crate provides the engine of a logic circuit simulator. Circuits are made of input sources,
//! logic gates and output sinks joined by wires, and are evaluated tick by tick.
//! Boolean expressions can be parsed, simplified, turned into circuits and extracted back from
//! them.
//!
//! # Usage
//!
//! Boolsim features circuit [simulation](https://en.wikipedia.org/wiki/Logic_simulation),
//! [truth tables](https://en.wikipedia.org/wiki/Truth_table) with minterms and Karnaugh maps,
//! and equivalence checking by exhaustive enumeration.
//! Circuits are stored as JSON documents, and can be exchanged with other tools in .bench format.
//!
//! ```bash
//! # Show available commands
//! boolsim help
//! # Build a circuit from an expression
//! boolsim parse "(A OR B) AND NOT C" -o circuit.json
//! # Show its statistics and truth table
//! boolsim show circuit.json
//! boolsim table circuit.json --csv table.csv
//! # Check it against another expression
//! boolsim equiv -e "(A OR B) AND NOT C" "(A AND NOT C) OR (B AND NOT C)"
//! # Run it for 100 ticks
//! boolsim simulate circuit.json --ticks 100
//! ```
//!
//! # Development
//!
//! ## Datastructures
//!
//! `Circuit` owns its components and connections, which refer to each other by id.
//! Each input slot of a component is driven by at most one connection, and connections made
//! through the usual API never close a cycle. Feedback loops can still be built on purpose with
//! `Circuit::force_connection`; the simulator tolerates them and reports oscillations.
//!
//! For example, here is a half adder:
//! ```
//! # use boolsim::circuit::{Circuit, Component, GateType, Point, SinkType, SourceType};
//! let mut circuit = Circuit::new();
//! let a = circuit.add_component(Component::source(SourceType::Switch, Point::default()));
//! let b = circuit.add_component(Component::source(SourceType::Switch, Point::default()));
//! let sum = circuit.add_component(Component::gate(GateType::Xor, Point::default()));
//! let carry = circuit.add_component(Component::gate(GateType::And, Point::default()));
//! for g in [&sum, &carry] {
//!     circuit.connect(&a, g, 0).unwrap();
//!     circuit.connect(&b, g, 1).unwrap();
//! }
//! let o = circuit.add_component(Component::sink(SinkType::Bulb, Point::default()));
//! circuit.connect(&sum, &o, 0).unwrap();
//! ```
//!
//! Expressions are a separate tree representation, `Expr`, that converts to and from circuits.

#![warn(missing_docs)]

pub mod analysis;
pub mod circuit;
pub mod cmd;
pub mod equiv;
pub mod error;
pub mod expr;
pub mod generators;
pub mod io;
pub mod sim;
pub mod table;

pub use analysis::{analyze, Analysis};
pub use circuit::{Circuit, Component, ComponentId, GateType, SinkType, SourceType};
pub use error::Error;
pub use expr::{parse, Expr};
pub use sim::Simulator;
pub use table::TruthTable;
