//! Read and write circuits and truth tables to files

pub mod bench;
pub mod csv;
pub mod json;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub use bench::{read_bench, write_bench};
pub use csv::{to_csv_string, write_csv};
pub use json::{
    read_json, to_json_string, write_json, CircuitDocument, ComponentRecord, ConnectionRecord,
    LoadOptions, LoadReport,
};

use crate::circuit::Circuit;
use crate::error::Error;
use crate::table::TruthTable;

fn extension(path: &Path) -> Result<String, Error> {
    match path.extension() {
        None => Err(Error::Unsupported(format!(
            "No extension given for {}",
            path.display()
        ))),
        Some(s) => Ok(s.to_string_lossy().to_lowercase()),
    }
}

/// Read a circuit from a file
///
/// Following extensions are supported: .json, .bench
pub fn read_circuit_file(
    path: &Path,
    options: &LoadOptions,
) -> Result<(Circuit, LoadReport), Error> {
    let ext = extension(path)?;
    let f = File::open(path)?;
    match ext.as_str() {
        "json" => Ok(read_json(f, options)?),
        "bench" => Ok((read_bench(f)?, LoadReport::default())),
        _ => Err(Error::Unsupported(format!("Unknown extension {}", ext))),
    }
}

/// Write a circuit to a file
///
/// Following extensions are supported: .json, .bench
pub fn write_circuit_file(path: &Path, circuit: &Circuit) -> Result<(), Error> {
    let ext = extension(path)?;
    if !["json", "bench"].contains(&ext.as_str()) {
        return Err(Error::Unsupported(format!("Unknown extension {}", ext)));
    }
    let mut f = BufWriter::new(File::create(path)?);
    if ext == "json" {
        write_json(&mut f, circuit)?;
    } else {
        write_bench(&mut f, circuit)?;
    }
    f.flush()?;
    Ok(())
}

/// Write a truth table to a CSV file
pub fn write_table_file(path: &Path, table: &TruthTable) -> Result<(), Error> {
    let mut f = BufWriter::new(File::create(path)?);
    write_csv(&mut f, table)?;
    f.flush()?;
    Ok(())
}
