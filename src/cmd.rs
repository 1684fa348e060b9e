//! Command line interface

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use kdam::{tqdm, BarExt};

use crate::analysis::analyze;
use crate::circuit::Circuit;
use crate::equiv::check_equivalence;
use crate::error::Error;
use crate::expr::{circuit_expressions, parse, parse_to_circuit, simplify_expression};
use crate::io::{read_circuit_file, write_circuit_file, write_table_file, LoadOptions};
use crate::sim::{Simulator, SimulatorConfig};
use crate::table::TruthTable;

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase the verbosity of the logs; repeat for more details
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Show statistics about a circuit
    ///
    /// Will print the number of inputs, outputs and gates, the depth and complexity of the circuit,
    /// the expression of its first output, and the problems found in it.
    #[clap()]
    Show(ShowArgs),

    /// Print the truth table of a circuit or an expression
    #[clap()]
    Table(TableArgs),

    /// Build a circuit from a boolean expression
    ///
    /// Operators can be written as words or symbols:
    ///    (A OR B) AND NOT C
    ///    (A + B) * !C
    #[clap()]
    Parse(ParseArgs),

    /// Simplify a boolean expression
    #[clap()]
    Simplify(SimplifyArgs),

    /// Print the expression computed by each output of a circuit
    #[clap()]
    Expr(ExprArgs),

    /// Check equivalence between two circuits or two expressions
    ///
    /// The command will fail if the two are not equivalent, and will output the
    /// first failing row of the truth table.
    #[clap(alias = "equiv")]
    CheckEquivalence(EquivArgs),

    /// Run a circuit over time
    ///
    /// Clocks toggle at their own frequency; the value of each output is printed at the end,
    /// together with any oscillation found on the way.
    #[clap(alias = "sim")]
    Simulate(SimulateArgs),

    /// Convert a circuit to another format
    ///
    /// Following extensions are supported: .json, .bench
    #[clap()]
    Export(ExportArgs),
}

fn load(path: &Path, strict: bool) -> Result<Circuit, Error> {
    let (circuit, report) = read_circuit_file(path, &LoadOptions { strict })?;
    if !report.is_complete() {
        println!(
            "Skipped {} connections while loading {}",
            report.skipped.len(),
            path.display()
        );
    }
    Ok(circuit)
}

/// Command arguments for circuit informations
#[derive(Args)]
pub struct ShowArgs {
    /// Circuit to show
    file: PathBuf,

    /// Reject documents whose connections form a cycle
    #[arg(long)]
    strict: bool,

    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,
}

impl ShowArgs {
    /// Run the command
    pub fn run(&self) -> Result<(), Error> {
        let circuit = load(&self.file, self.strict)?;
        let analysis = analyze(&circuit);
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&analysis).map_err(crate::error::DocumentError::from)?
            );
        } else {
            println!("{}", analysis);
        }
        Ok(())
    }
}

/// Command arguments for truth tables
#[derive(Args)]
pub struct TableArgs {
    /// Circuit to tabulate
    #[arg(required_unless_present = "expression")]
    file: Option<PathBuf>,

    /// Expression to tabulate instead of a circuit
    #[arg(short = 'e', long, conflicts_with = "file")]
    expression: Option<String>,

    /// Output file for the table in CSV format
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Also print the minterms and maxterms
    #[arg(long)]
    terms: bool,

    /// Also print the Karnaugh map, for 2 or 3 inputs
    #[arg(long)]
    karnaugh: bool,
}

impl TableArgs {
    /// Run the command
    pub fn run(&self) -> Result<(), Error> {
        let table = match (&self.expression, &self.file) {
            (Some(e), _) => TruthTable::from_expression(e)?,
            (None, Some(f)) => {
                let mut circuit = load(f, false)?;
                TruthTable::from_circuit(&mut circuit).ok_or_else(|| {
                    Error::Unsupported("The circuit needs at least one input and one output".into())
                })?
            }
            (None, None) => return Err(Error::Unsupported("Nothing to tabulate".into())),
        };
        print!("{}", table);
        if self.terms {
            for t in table.minterms() {
                println!("Minterms of {}: {}", t.output, t.join("OR"));
            }
            for t in table.maxterms() {
                println!("Maxterms of {}: {}", t.output, t.join("AND"));
            }
        }
        if self.karnaugh {
            match table.karnaugh_map() {
                Some(k) => print!("{}", k),
                None => println!("Karnaugh maps are only available for 2 or 3 inputs"),
            }
        }
        if let Some(path) = &self.csv {
            write_table_file(path, &table)?;
        }
        Ok(())
    }
}

/// Command arguments for circuit synthesis
#[derive(Args)]
pub struct ParseArgs {
    /// Expression to build
    expression: String,

    /// Output file for the circuit
    #[arg(short = 'o', long)]
    output: PathBuf,
}

impl ParseArgs {
    /// Run the command
    pub fn run(&self) -> Result<(), Error> {
        let circuit = parse_to_circuit(&self.expression)?;
        write_circuit_file(&self.output, &circuit)
    }
}

/// Command arguments for expression simplification
#[derive(Args)]
pub struct SimplifyArgs {
    /// Expression to simplify
    expression: String,
}

impl SimplifyArgs {
    /// Run the command
    pub fn run(&self) -> Result<(), Error> {
        println!("{}", simplify_expression(&self.expression)?);
        Ok(())
    }
}

/// Command arguments for expression extraction
#[derive(Args)]
pub struct ExprArgs {
    /// Circuit to read
    file: PathBuf,

    /// Simplify the expressions
    #[arg(short = 's', long)]
    simplify: bool,
}

impl ExprArgs {
    /// Run the command
    pub fn run(&self) -> Result<(), Error> {
        let circuit = load(&self.file, false)?;
        for (name, e) in circuit_expressions(&circuit) {
            match e {
                Some(e) if self.simplify => println!("{} = {}", name, e.simplify()),
                Some(e) => println!("{} = {}", name, e),
                None => println!("{} is not fully connected", name),
            }
        }
        Ok(())
    }
}

/// Command arguments for equivalence checking
#[derive(Args)]
pub struct EquivArgs {
    /// First circuit to compare
    first: String,
    /// Second circuit to compare
    second: String,

    /// Compare two expressions instead of two circuit files
    #[arg(short = 'e', long)]
    expressions: bool,
}

impl EquivArgs {
    fn table(&self, arg: &str) -> Result<TruthTable, Error> {
        if self.expressions {
            let e = parse(arg)?;
            return Ok(TruthTable::from_expr(&e, &e.variables()));
        }
        let mut circuit = load(Path::new(arg), false)?;
        TruthTable::from_circuit(&mut circuit).ok_or_else(|| {
            Error::Unsupported(format!("{} needs at least one input and one output", arg))
        })
    }

    /// Run the command
    pub fn run(&self) -> Result<(), Error> {
        let t1 = self.table(&self.first)?;
        let t2 = self.table(&self.second)?;
        if t1.inputs() != t2.inputs() {
            println!(
                "Different inputs: {} vs {}. Circuits are not equivalent",
                t1.inputs().join(", "),
                t2.inputs().join(", ")
            );
            std::process::exit(1);
        }
        match check_equivalence(&t1, &t2) {
            Err(pattern) => {
                println!("Circuits are not equivalent");
                if !pattern.is_empty() {
                    println!("Test pattern:");
                    for (name, b) in t1.inputs().iter().zip(&pattern) {
                        println!("  {}: {}", name, *b as u8);
                    }
                }
                std::process::exit(1);
            }
            Ok(()) => {
                println!("Circuits are equivalent");
                Ok(())
            }
        }
    }
}

/// Command arguments for simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Circuit to simulate
    file: PathBuf,

    /// Number of ticks
    #[arg(short = 'n', long, default_value_t = 100)]
    ticks: usize,

    /// Time between two ticks, in milliseconds
    #[arg(long, default_value_t = 50.0)]
    interval: f64,

    /// Number of ticks considered by the oscillation guard
    #[arg(long, default_value_t = 10)]
    oscillation_window: usize,

    /// Number of repetitions of a state that triggers the oscillation guard
    #[arg(long, default_value_t = 5)]
    oscillation_threshold: usize,

    /// Disable the oscillation guard
    #[arg(long)]
    no_oscillation_check: bool,

    /// Reject documents whose connections form a cycle
    #[arg(long)]
    strict: bool,
}

impl SimulateArgs {
    /// Run the command
    pub fn run(&self) -> Result<(), Error> {
        let mut circuit = load(&self.file, self.strict)?;
        let mut sim = Simulator::with_config(SimulatorConfig {
            oscillation_window: self.oscillation_window,
            oscillation_threshold: self.oscillation_threshold,
            detect_oscillations: !self.no_oscillation_check,
            step_interval: self.interval,
        });
        let mut progress = tqdm!(total = self.ticks);
        progress.set_description("Ticks");
        let mut nb_oscillations = 0;
        for i in 1..=self.ticks {
            let report = sim.tick(&mut circuit, i as f64 * self.interval);
            if let Some(osc) = report.oscillation {
                nb_oscillations += 1;
                progress.write(format!("Tick {}: {}", i, osc))?;
            }
            progress.set_postfix(format!("oscillations={}", nb_oscillations));
            progress.update(1)?;
        }
        progress.write(format!(
            "Simulated {} ticks, {} component evaluations",
            self.ticks,
            sim.nb_evaluations()
        ))?;
        for s in circuit.sinks() {
            println!("{} = {}", s.display_name(), s.value());
        }
        Ok(())
    }
}

/// Command arguments for format conversion
#[derive(Args)]
pub struct ExportArgs {
    /// Circuit to convert
    file: PathBuf,

    /// Output file
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Reject documents whose connections form a cycle
    #[arg(long)]
    strict: bool,
}

impl ExportArgs {
    /// Run the command
    pub fn run(&self) -> Result<(), Error> {
        let circuit = load(&self.file, self.strict)?;
        write_circuit_file(&self.output, &circuit)
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
        let cli = Cli::try_parse_from(["boolsim", "-vv", "equiv", "-e", "A", "NOT NOT A"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::CheckEquivalence(_)));
        let cli =
            Cli::try_parse_from(["boolsim", "table", "-e", "A AND B", "--csv", "t.csv"]).unwrap();
        assert!(matches!(cli.command, Commands::Table(_)));
        assert!(Cli::try_parse_from(["boolsim", "table"]).is_err());
    }
}
