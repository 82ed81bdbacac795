//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Datalens: question-driven analytics over tabular datasets
#[derive(Parser)]
#[command(name = "datalens")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Profile a dataset: semantic types and per-column statistics
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask a natural-language question about a dataset
    Ask {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// The question, e.g. "What is the average of revenue?"
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,

        /// Attach deterministic mock explanations (no API calls)
        #[arg(long)]
        mock_explain: bool,
    },

    /// Run the three-phase baseline report for a dataset
    Baseline {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare a metric's distribution between the two outcome groups
    Drilldown {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Metric column to drill into (typically from a key difference)
        #[arg(short, long)]
        metric: String,

        /// Optional secondary categorical dimension
        #[arg(short, long)]
        dimension: Option<String>,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },
}
