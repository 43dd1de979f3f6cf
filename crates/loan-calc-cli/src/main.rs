mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;

use commands::convert::{InsuranceArgs, TermArgs};
use commands::loan::LoanArgs;
use output::OutputFormat;

/// Loan payment and amortization calculations
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Loan payment and amortization calculations",
    long_about = "A CLI for computing fixed-rate loan payments with decimal precision. \
                  Produces the periodic payment, total cost, effective annual rate and \
                  a full amortization table, with optional fixed or percentage insurance."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Decimal places for money amounts in the output
    #[arg(long, default_value_t = 2, global = true)]
    precision: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full amortization table
    Schedule(LoanArgs),
    /// Calculate the periodic payment and total cost of a loan
    Payment(LoanArgs),
    /// Convert insurance between a per-period amount and a percentage of principal
    Insurance(InsuranceArgs),
    /// Convert loan duration between months and years
    Term(TermArgs),
    /// Print version information
    Version,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("LOANCALC_LOG", "warn")).init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::loan::run_schedule(args, cli.precision),
        Commands::Payment(args) => commands::loan::run_payment(args, cli.precision),
        Commands::Insurance(args) => commands::convert::run_insurance(args, cli.precision),
        Commands::Term(args) => commands::convert::run_term(args),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
