mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::probability::ProbabilityArgs;
use commands::scores::ScoreArgs;

/// Financial-distress scoring from point-in-time fundamentals
#[derive(Parser)]
#[command(
    name = "distress",
    version,
    about = "Financial-distress scoring from point-in-time fundamentals",
    long_about = "Scores a company from a JSON snapshot of reported figures with \
                  decimal precision. Supports the Piotroski F-Score, the Altman \
                  Z-Score family, the Ohlson O-Score and the Campbell-Hilscher-Szilagyi \
                  failure probability."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Piotroski F-Score (nine binary signals, 0-9)
    Piotroski(ScoreArgs),
    /// Altman Z-Score (variant chosen from listing, sector and geography)
    Altman(ScoreArgs),
    /// Ohlson O-Score
    Ohlson(ScoreArgs),
    /// Campbell-Hilscher-Szilagyi failure probability
    Chs(ScoreArgs),
    /// Every model for one company
    Report(ScoreArgs),
    /// Logistic probability of a linear log-odds score
    Probability(ProbabilityArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Piotroski(args) => commands::scores::run_piotroski(args),
        Commands::Altman(args) => commands::scores::run_altman(args),
        Commands::Ohlson(args) => commands::scores::run_ohlson(args),
        Commands::Chs(args) => commands::scores::run_chs(args),
        Commands::Report(args) => commands::scores::run_report(args),
        Commands::Probability(args) => commands::probability::run_probability(args),
        Commands::Version => {
            println!("distress {}", env!("CARGO_PKG_VERSION"));
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
