//! CLI command implementations.

pub mod compare;
pub mod profile;
pub mod rules;
pub mod validate;

use std::path::Path;

use colored::{ColoredString, Colorize};
use eventshape::{EventShape, ShapeConfig};

/// What a command found, mapped to the process exit code.
pub enum Outcome {
    Clean,
    Broken,
}

pub type CommandResult = Result<Outcome, Box<dyn std::error::Error>>;

/// Build the pipeline from an optional TOML config file.
pub fn build_shape(config: Option<&Path>) -> Result<EventShape, Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => ShapeConfig::from_toml_file(path)?,
        None => ShapeConfig::default(),
    };
    Ok(EventShape::with_config(config)?)
}

/// Fail early with a readable message when an input is missing.
pub fn require_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }
    Ok(())
}

/// Pass rate as a percentage, colored against the acceptance rate.
pub fn colored_rate(rate: f64, acceptance: f64) -> ColoredString {
    let text = format!("{:.1}%", rate * 100.0);
    if rate >= acceptance {
        text.green()
    } else if rate > 0.0 {
        text.yellow()
    } else {
        text.red()
    }
}
