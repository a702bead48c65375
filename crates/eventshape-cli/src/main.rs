//! EventShape CLI - shape compatibility checks for event parameters.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Exit code when a comparison finds a broken parameter.
const EXIT_BROKEN: i32 = 2;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let shape = match commands::build_shape(cli.config.as_deref()) {
        Ok(shape) => {
            tracing::debug!(config = ?shape.config(), "configuration loaded");
            shape
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Profile { file, json } => commands::profile::run(&shape, file, json, cli.verbose),

        Commands::Rules { file, output } => commands::rules::run(&shape, file, output, cli.verbose),

        Commands::Validate { file, rules, json } => {
            commands::validate::run(&shape, file, rules, json, cli.verbose)
        }

        Commands::Compare {
            old,
            new,
            rules,
            output,
            json,
        } => commands::compare::run(&shape, old, new, rules, output, json, cli.verbose),
    };

    match result {
        Ok(commands::Outcome::Clean) => {}
        Ok(commands::Outcome::Broken) => std::process::exit(EXIT_BROKEN),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
