//! Datalens CLI - question-driven analytics over flat tabular files.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Profile { file, json } => commands::profile::run(file, json),

        Commands::Ask {
            file,
            question,
            json,
            mock_explain,
        } => commands::ask::run(file, question, json, mock_explain),

        Commands::Baseline { file, json } => commands::baseline::run(file, json),

        Commands::Drilldown {
            file,
            metric,
            dimension,
            json,
        } => commands::drilldown::run(file, metric, dimension, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
