//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EventShape: compare event parameter shapes across software versions
#[derive(Parser)]
#[command(name = "eventshape")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML file with analysis and report thresholds
    #[arg(short, long, global = true, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Infer a type and constraints for every parameter of a dataset
    Profile {
        /// Path to the events file (JSONL/CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate validation rules from a dataset and save them
    Rules {
        /// Path to the events file (JSONL/CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for the rule set (default: <file>.rules.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a dataset against a saved rule set
    Validate {
        /// Path to the events file (JSONL/CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to the rule set
        #[arg(short, long, value_name = "RULES")]
        rules: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare the events of two versions
    Compare {
        /// Events of the old version
        #[arg(value_name = "OLD")]
        old: PathBuf,

        /// Events of the new version
        #[arg(value_name = "NEW")]
        new: PathBuf,

        /// Use a saved rule set instead of inferring one from OLD
        #[arg(short, long, value_name = "RULES")]
        rules: Option<PathBuf>,

        /// Write the JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the JSON report instead of the summary
        #[arg(long)]
        json: bool,
    },
}
