//! Profile command - infer a type and constraints per parameter.

use std::path::PathBuf;

use colored::Colorize;
use eventshape::EventShape;

use super::{require_file, CommandResult, Outcome};

pub fn run(shape: &EventShape, file: PathBuf, json_output: bool, verbose: bool) -> CommandResult {
    require_file(&file)?;

    let source = shape.open(&file)?;
    let profiles = shape.profile_source(source.as_ref())?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(Outcome::Clean);
    }

    println!(
        "{} {}",
        "Profiles for".cyan().bold(),
        file.display().to_string().white()
    );
    println!();

    let threshold = shape.config().confidence_threshold;
    for profile in profiles.values() {
        let confidence = format!("{:.0}%", profile.confidence * 100.0);
        let confidence = if profile.is_confident(threshold) {
            confidence.green()
        } else {
            confidence.yellow()
        };

        println!(
            "  {:24} {:24} {:>5}  n={} nulls={}",
            profile.name,
            profile.inferred_type.to_string(),
            confidence,
            profile.sample_size,
            profile.null_count
        );

        if verbose {
            for candidate in &profile.candidates {
                println!(
                    "      {:22} {:.3}",
                    candidate.inferred_type.to_string().dimmed(),
                    candidate.match_ratio
                );
            }
        }
    }

    let low = profiles
        .values()
        .filter(|p| p.insufficient_data || !p.is_confident(threshold))
        .count();
    println!();
    println!(
        "Profiled {} parameters ({} low confidence)",
        profiles.len().to_string().white().bold(),
        low.to_string().yellow()
    );

    Ok(Outcome::Clean)
}
