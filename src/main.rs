use boolsim::cmd::{Cli, Commands};
use clap::Parser;
use tracing::Level;

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let res = match cli.command {
        Commands::Show(a) => a.run(),
        Commands::Table(a) => a.run(),
        Commands::Parse(a) => a.run(),
        Commands::Simplify(a) => a.run(),
        Commands::Expr(a) => a.run(),
        Commands::CheckEquivalence(a) => a.run(),
        Commands::Simulate(a) => a.run(),
        Commands::Export(a) => a.run(),
    };
    if let Err(e) = res {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
