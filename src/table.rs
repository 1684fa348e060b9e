//! Truth tables of circuits and expressions
//!
//! ```
//! use boolsim::expr::parse_to_circuit;
//! use boolsim::table::TruthTable;
//! let mut circuit = parse_to_circuit("A AND B").unwrap();
//! let table = TruthTable::from_circuit(&mut circuit).unwrap();
//! assert_eq!(table.inputs(), ["A", "B"]);
//! assert_eq!(table.output_column(0), vec![false, false, false, true]);
//! ```

use std::fmt;

use itertools::Itertools;

use crate::circuit::{Circuit, SourceType};
use crate::error::ParseError;
use crate::expr::{parse, Expr};
use crate::sim::Simulator;

/// Values of n variables for a row, the first variable being the most significant bit
pub fn assignment(row: usize, n: usize) -> Vec<bool> {
    (0..n).map(|j| (row >> (n - j - 1)) & 1 != 0).collect()
}

/// A row of a truth table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Input values, in column order
    pub inputs: Vec<bool>,
    /// Output values, in column order
    pub outputs: Vec<bool>,
}

/// A product (minterm) or sum (maxterm) of literals for a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Index of the row
    pub index: usize,
    /// Term as an expression
    pub text: String,
}

/// Minterms or maxterms of an output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terms {
    /// Name of the output
    pub output: String,
    /// Terms, by row index
    pub terms: Vec<Term>,
}

impl Terms {
    /// Terms combined into a single expression with the given operator
    pub fn join(&self, op: &str) -> String {
        self.terms
            .iter()
            .map(|t| format!("({})", t.text))
            .join(&format!(" {} ", op))
    }
}

/// Karnaugh map of the first output, for 2 or 3 inputs
///
/// Rows follow the first input; columns follow the remaining inputs in Gray code order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KarnaughMap {
    /// Names of the inputs
    pub variables: Vec<String>,
    /// Cell values, indexed by row then column
    pub cells: Vec<Vec<bool>>,
}

const GRAY_CODE: [usize; 4] = [0, 1, 3, 2];

impl fmt::Display for KarnaughMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nb_col_vars = self.variables.len() - 1;
        let col_labels = GRAY_CODE
            .iter()
            .filter(|g| **g < 1 << nb_col_vars)
            .map(|g| format!("{:0width$b}", g, width = nb_col_vars))
            .collect::<Vec<_>>();
        writeln!(
            f,
            "{}\\{}  {}",
            self.variables[0],
            self.variables[1..].join(""),
            col_labels.join("  ")
        )?;
        let pad = self.variables[0].len() + 1 + self.variables[1..].join("").len();
        for (i, row) in self.cells.iter().enumerate() {
            write!(f, "{:>pad$}", i, pad = pad)?;
            for (cell, label) in row.iter().zip(&col_labels) {
                write!(f, "  {:>w$}", *cell as u8, w = label.len())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Truth table with named inputs and outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    inputs: Vec<String>,
    outputs: Vec<String>,
    rows: Vec<Row>,
}

impl TruthTable {
    /// Create an empty table
    pub fn new(inputs: Vec<String>, outputs: Vec<String>) -> TruthTable {
        TruthTable {
            inputs,
            outputs,
            rows: Vec::new(),
        }
    }

    /// Add a row
    pub fn push(&mut self, row: Row) {
        assert_eq!(row.inputs.len(), self.inputs.len());
        assert_eq!(row.outputs.len(), self.outputs.len());
        self.rows.push(row);
    }

    /// Generate the table of a circuit by evaluating it for every input combination
    ///
    /// Inputs are the switches and constant sources, sorted by name; outputs are all sinks, sorted
    /// by name.
    /// Returns None if the circuit has no input or no output.
    /// The sources keep the values of the last row.
    pub fn from_circuit(circuit: &mut Circuit) -> Option<TruthTable> {
        let inputs = circuit
            .sources()
            .into_iter()
            .filter(|c| {
                matches!(
                    c.as_source().map(|s| s.kind()),
                    Some(SourceType::Switch | SourceType::High | SourceType::Low)
                )
            })
            .map(|c| (c.id().clone(), c.display_name().to_string()))
            .sorted_by(|a, b| a.1.cmp(&b.1))
            .collect::<Vec<_>>();
        let outputs = circuit
            .sinks()
            .into_iter()
            .map(|c| (c.id().clone(), c.display_name().to_string()))
            .sorted_by(|a, b| a.1.cmp(&b.1))
            .collect::<Vec<_>>();
        if inputs.is_empty() || outputs.is_empty() {
            return None;
        }

        let mut table = TruthTable::new(
            inputs.iter().map(|i| i.1.clone()).collect(),
            outputs.iter().map(|o| o.1.clone()).collect(),
        );
        let mut sim = Simulator::new();
        let n = inputs.len();
        for row in 0..1usize << n {
            let values = assignment(row, n);
            for ((id, _), v) in inputs.iter().zip(&values) {
                if let Some(s) = circuit.component_mut(id).and_then(|c| c.as_source_mut()) {
                    s.set_value(*v);
                }
            }
            sim.evaluate(circuit);
            let outs = outputs
                .iter()
                .map(|(id, _)| circuit.component(id).is_some_and(|c| c.value().as_bool()))
                .collect();
            table.push(Row {
                inputs: values,
                outputs: outs,
            });
        }
        Some(table)
    }

    /// Table of an expression over the given variables, with a single output
    pub fn from_expr(e: &Expr, variables: &[String]) -> TruthTable {
        let mut table = TruthTable::new(variables.to_vec(), vec![e.to_string()]);
        for (row, v) in e.truth_table(variables).into_iter().enumerate() {
            table.push(Row {
                inputs: assignment(row, variables.len()),
                outputs: vec![v],
            });
        }
        table
    }

    /// Table of an expression over its own variables
    pub fn from_expression(text: &str) -> Result<TruthTable, ParseError> {
        let e = parse(text)?;
        Ok(TruthTable::from_expr(&e, &e.variables()))
    }

    /// Names of the inputs
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Names of the outputs
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Rows, from all-zero to all-one inputs
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows
    pub fn nb_rows(&self) -> usize {
        self.rows.len()
    }

    /// Values of an output over all rows
    pub fn output_column(&self, output: usize) -> Vec<bool> {
        self.rows.iter().map(|r| r.outputs[output]).collect()
    }

    fn terms(&self, minterms: bool) -> Vec<Terms> {
        let (op, negated_when) = if minterms {
            (" AND ", false)
        } else {
            (" OR ", true)
        };
        self.outputs
            .iter()
            .enumerate()
            .map(|(o, name)| Terms {
                output: name.clone(),
                terms: self
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| row.outputs[o] == minterms)
                    .map(|(index, row)| Term {
                        index,
                        text: self
                            .inputs
                            .iter()
                            .zip(&row.inputs)
                            .map(|(var, v)| {
                                if *v == negated_when {
                                    format!("NOT {}", var)
                                } else {
                                    var.clone()
                                }
                            })
                            .join(op),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Minterms of each output: one product per row where the output is 1
    pub fn minterms(&self) -> Vec<Terms> {
        self.terms(true)
    }

    /// Maxterms of each output: one sum per row where the output is 0
    pub fn maxterms(&self) -> Vec<Terms> {
        self.terms(false)
    }

    /// Karnaugh map of the first output; only 2 and 3 inputs are supported
    pub fn karnaugh_map(&self) -> Option<KarnaughMap> {
        let n = self.inputs.len();
        if !(2..=3).contains(&n) || self.outputs.is_empty() {
            return None;
        }
        let nb_cols = 1 << (n - 1);
        let mut cells = vec![vec![false; nb_cols]; 2];
        for row in &self.rows {
            let r = row.inputs[0] as usize;
            let rest = row.inputs[1..]
                .iter()
                .fold(0, |acc, b| (acc << 1) | *b as usize);
            let col = GRAY_CODE.iter().position(|g| *g == rest)?;
            cells[r][col] = row.outputs[0];
        }
        Some(KarnaughMap {
            variables: self.inputs.clone(),
            cells,
        })
    }

    /// Export as CSV
    pub fn to_csv(&self) -> String {
        crate::io::csv::to_csv_string(self)
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} | {}",
            self.inputs.join(" "),
            self.outputs.join(" ")
        )?;
        for row in &self.rows {
            let inputs = self
                .inputs
                .iter()
                .zip(&row.inputs)
                .map(|(name, v)| format!("{:>w$}", *v as u8, w = name.len()))
                .join(" ");
            let outputs = self
                .outputs
                .iter()
                .zip(&row.outputs)
                .map(|(name, v)| format!("{:>w$}", *v as u8, w = name.len()))
                .join(" ");
            writeln!(f, "{} | {}", inputs, outputs)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{assignment, TruthTable};
    use crate::circuit::{Circuit, Component, Point, SinkType, SourceType};
    use crate::expr::parse_to_circuit;

    #[test]
    fn test_assignment() {
        assert_eq!(assignment(0, 3), vec![false, false, false]);
        assert_eq!(assignment(1, 3), vec![false, false, true]);
        assert_eq!(assignment(6, 3), vec![true, true, false]);
    }

    #[test]
    fn test_and() {
        let mut c = parse_to_circuit("A AND B").unwrap();
        let t = TruthTable::from_circuit(&mut c).unwrap();
        assert_eq!(t.inputs(), ["A", "B"]);
        assert_eq!(t.outputs(), ["Output"]);
        assert_eq!(t.nb_rows(), 4);
        assert_eq!(t.rows()[2].inputs, vec![true, false]);
        assert_eq!(t.output_column(0), vec![false, false, false, true]);
    }

    #[test]
    fn test_no_inputs() {
        let mut c = Circuit::new();
        c.add_component(Component::sink(SinkType::Bulb, Point::default()));
        assert!(TruthTable::from_circuit(&mut c).is_none());
        let mut c = Circuit::new();
        c.add_component(Component::source(SourceType::Switch, Point::default()));
        assert!(TruthTable::from_circuit(&mut c).is_none());
        // Buttons and clocks are not enumerated
        let mut c = Circuit::new();
        c.add_component(Component::source(SourceType::Button, Point::default()));
        c.add_component(Component::sink(SinkType::Bulb, Point::default()));
        assert!(TruthTable::from_circuit(&mut c).is_none());
    }

    #[test]
    fn test_from_expression() {
        let t = TruthTable::from_expression("B OR NOT A").unwrap();
        assert_eq!(t.inputs(), ["A", "B"]);
        assert_eq!(t.outputs(), ["(B OR NOT A)"]);
        assert_eq!(t.output_column(0), vec![true, true, false, true]);
    }

    #[test]
    fn test_terms() {
        let t = TruthTable::from_expression("A XOR B").unwrap();
        let min = t.minterms();
        assert_eq!(min.len(), 1);
        let texts: Vec<_> = min[0].terms.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["NOT A AND B", "A AND NOT B"]);
        assert_eq!(min[0].terms[0].index, 1);
        assert_eq!(min[0].join("OR"), "(NOT A AND B) OR (A AND NOT B)");
        let max = t.maxterms();
        let texts: Vec<_> = max[0].terms.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["A OR B", "NOT A OR NOT B"]);
    }

    #[test]
    fn test_karnaugh() {
        let t = TruthTable::from_expression("A AND NOT B").unwrap();
        let k = t.karnaugh_map().unwrap();
        assert_eq!(k.cells, vec![vec![false, false], vec![true, false]]);

        let t = TruthTable::from_expression("A OR (B AND NOT C)").unwrap();
        let k = t.karnaugh_map().unwrap();
        // Columns are BC = 00, 01, 11, 10
        assert_eq!(
            k.cells,
            vec![vec![false, false, false, true], vec![true, true, true, true]]
        );
        for row in t.rows() {
            let r = row.inputs[0] as usize;
            let bc = (row.inputs[1] as usize) * 2 + row.inputs[2] as usize;
            let col = [0, 1, 3, 2].iter().position(|g| *g == bc).unwrap();
            assert_eq!(k.cells[r][col], row.outputs[0]);
        }
        assert!(k.to_string().contains("00  01  11  10"));

        assert!(TruthTable::from_expression("A").unwrap().karnaugh_map().is_none());
        assert!(TruthTable::from_expression("A AND B AND C AND D")
            .unwrap()
            .karnaugh_map()
            .is_none());
    }

    #[test]
    fn test_display() {
        let t = TruthTable::from_expression("A AND B").unwrap();
        let s = t.to_string();
        let lines: Vec<_> = s.lines().collect();
        assert_eq!(lines[0], "A B | (A AND B)");
        assert_eq!(lines[4], format!("1 1 | {:>9}", 1));
    }
}
