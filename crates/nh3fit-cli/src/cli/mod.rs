//! Command-line front end for ammonia spectral synthesis and fitting.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "nh3fit",
    about = "Synthesize and fit ammonia inversion-transition spectra",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Synthesize a model spectrum from a JSON request.
    Synthesize {
        /// JSON request file describing the axis and physical parameters.
        #[arg(long)]
        input: PathBuf,
        /// Write the JSON response here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fit one or more velocity components to an observed spectrum.
    Fit {
        /// JSON request file with the axis, observed data, and fit settings.
        #[arg(long)]
        input: PathBuf,
        /// Write the JSON response here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub fn run_from_env() -> i32 {
    init_tracing();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Synthesize { input, output } => {
            commands::run_synthesize(&input, output.as_deref())
        }
        Command::Fit { input, output } => commands::run_fit(&input, output.as_deref()),
    };

    match outcome {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("Error: {error:#}");
            1
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
