//! CSV export of truth tables
//!
//! The header lists the inputs, an empty separator column, then the outputs:
//! ```text
//! A,B,,Output
//! 0,0,,0
//! 0,1,,0
//! 1,0,,0
//! 1,1,,1
//! ```

use std::io::Write;

use itertools::Itertools;

use crate::table::TruthTable;

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn bits(values: &[bool]) -> String {
    values.iter().map(|v| if *v { "1" } else { "0" }).join(",")
}

/// Write a truth table in CSV format
pub fn write_csv<W: Write>(w: &mut W, table: &TruthTable) -> std::io::Result<()> {
    writeln!(
        w,
        "{},,{}",
        table.inputs().iter().map(|s| csv_field(s)).join(","),
        table.outputs().iter().map(|s| csv_field(s)).join(",")
    )?;
    for row in table.rows() {
        writeln!(w, "{},,{}", bits(&row.inputs), bits(&row.outputs))?;
    }
    Ok(())
}

/// Truth table in CSV format
pub fn to_csv_string(table: &TruthTable) -> String {
    let mut buf = Vec::new();
    write_csv(&mut buf, table).expect("Writing to memory cannot fail");
    String::from_utf8(buf).expect("CSV output is valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::to_csv_string;
    use crate::expr::parse_to_circuit;
    use crate::table::TruthTable;

    #[test]
    fn test_basic() {
        let mut c = parse_to_circuit("A AND B").unwrap();
        let t = TruthTable::from_circuit(&mut c).unwrap();
        assert_eq!(
            to_csv_string(&t),
            "A,B,,Output\n0,0,,0\n0,1,,0\n1,0,,0\n1,1,,1\n"
        );
        assert_eq!(t.to_csv(), to_csv_string(&t));
    }

    #[test]
    fn test_quoting() {
        let t = TruthTable::from_expression("NOT A").unwrap();
        let csv = to_csv_string(&t);
        assert_eq!(csv.lines().next(), Some("A,,NOT A"));
        let t = TruthTable::new(vec!["a,b".to_string()], vec!["x".to_string()]);
        assert_eq!(to_csv_string(&t), "\"a,b\",,x\n");
    }
}
