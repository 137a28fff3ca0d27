pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "smeta",
    about = "Smeta quotation calculator CLI",
    long_about = "Run the multi-phase pricing calculation over a quote file, inspect the \
                  effective rate book, or pre-validate input.",
    after_help = "Examples:\n  smeta calculate --input quote.json --pretty\n  smeta rates --rates rates.toml\n  smeta check --input quote.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run the full calculation and print the outcome as JSON")]
    Calculate {
        #[arg(long, help = "Quote file (JSON) with lines and variables")]
        input: PathBuf,
        #[arg(long, help = "Rate-book TOML merged over the built-in defaults")]
        rates: Option<PathBuf>,
        #[arg(long, help = "Pretty-print the outcome")]
        pretty: bool,
    },
    #[command(about = "Print the effective country and markup rate tables")]
    Rates {
        #[arg(long, help = "Rate-book TOML merged over the built-in defaults")]
        rates: Option<PathBuf>,
    },
    #[command(about = "Validate a quote file without running the calculation")]
    Check {
        #[arg(long, help = "Quote file (JSON) with lines and variables")]
        input: PathBuf,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Calculate { input, rates, pretty } => {
            commands::calculate::run(&input, rates.as_deref(), pretty)
        }
        Command::Rates { rates } => commands::rates::run(rates.as_deref()),
        Command::Check { input } => commands::check::run(&input),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
