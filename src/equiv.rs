//! Equivalence checking and grading by truth tables

use itertools::Itertools;

use crate::circuit::Circuit;
use crate::error::ParseError;
use crate::expr::parse;
use crate::table::TruthTable;

/// Returns whether two tables have the same number of rows and the same first output on each row
pub fn compare_truth_tables(a: &TruthTable, b: &TruthTable) -> bool {
    a.nb_rows() == b.nb_rows()
        && a
            .rows()
            .iter()
            .zip(b.rows())
            .all(|(x, y)| x.outputs.first() == y.outputs.first())
}

/// Check that two tables have the same inputs and outputs on every row
///
/// On failure, return the first input pattern where they differ.
/// An empty pattern means that the inputs themselves differ.
pub fn check_equivalence(a: &TruthTable, b: &TruthTable) -> Result<(), Vec<bool>> {
    if a.inputs().len() != b.inputs().len()
        || a.outputs().len() != b.outputs().len()
        || a.nb_rows() != b.nb_rows()
    {
        return Err(Vec::new());
    }
    for (x, y) in a.rows().iter().zip(b.rows()) {
        if x.outputs != y.outputs {
            return Err(x.inputs.clone());
        }
    }
    Ok(())
}

/// Row where a circuit differs from the expected function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Index of the row
    pub index: usize,
    /// Input values of the row
    pub inputs: Vec<bool>,
    /// Value of the expression
    pub expected: bool,
    /// Value of the circuit
    pub actual: bool,
}

/// Row-by-row comparison of a circuit against an expression
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comparison {
    /// Indices of the matching rows
    pub matches: Vec<usize>,
    /// Rows that do not match
    pub mismatches: Vec<Mismatch>,
}

impl Comparison {
    /// Returns whether all rows match
    pub fn is_equivalent(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Percentage of matching rows
    pub fn accuracy(&self) -> f64 {
        let total = self.matches.len() + self.mismatches.len();
        if total == 0 {
            0.0
        } else {
            100.0 * self.matches.len() as f64 / total as f64
        }
    }
}

/// Compare the first output of a circuit with an expression over the circuit inputs
///
/// Variables of the expression are matched with the names of the circuit inputs.
/// Returns None if the circuit has no truth table.
pub fn compare_with_expression(
    circuit: &mut Circuit,
    text: &str,
) -> Result<Option<Comparison>, ParseError> {
    let e = parse(text)?;
    let Some(table) = TruthTable::from_circuit(circuit) else {
        return Ok(None);
    };
    let expected = e.truth_table(table.inputs());
    let mut ret = Comparison::default();
    for (index, (row, exp)) in table.rows().iter().zip(expected).enumerate() {
        let actual = row.outputs[0];
        if actual == exp {
            ret.matches.push(index);
        } else {
            ret.mismatches.push(Mismatch {
                index,
                inputs: row.inputs.clone(),
                expected: exp,
                actual,
            });
        }
    }
    Ok(Some(ret))
}

/// Returns whether two expressions compute the same function of the union of their variables
pub fn expressions_equivalent(a: &str, b: &str) -> Result<bool, ParseError> {
    let a = parse(a)?;
    let b = parse(b)?;
    let vars = a
        .variables()
        .into_iter()
        .chain(b.variables())
        .sorted()
        .dedup()
        .collect::<Vec<_>>();
    Ok(a.to_lut(&vars) == b.to_lut(&vars))
}

/// Returns whether two circuits have the same truth table
pub fn circuits_equivalent(a: &mut Circuit, b: &mut Circuit) -> bool {
    match (TruthTable::from_circuit(a), TruthTable::from_circuit(b)) {
        (Some(ta), Some(tb)) => check_equivalence(&ta, &tb).is_ok(),
        _ => false,
    }
}
