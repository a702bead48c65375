//! Compare command - run the full pipeline on two versions.

use std::path::{Path, PathBuf};

use colored::Colorize;
use eventshape::{ComparisonReport, EventShape, ParameterStatus, RuleSet};

use super::{colored_rate, require_file, CommandResult, Outcome};

pub fn run(
    shape: &EventShape,
    old: PathBuf,
    new: PathBuf,
    rules: Option<PathBuf>,
    output: Option<PathBuf>,
    json_output: bool,
    verbose: bool,
) -> CommandResult {
    require_file(&old)?;
    require_file(&new)?;

    let old_source = shape.open(&old)?;
    let new_source = shape.open(&new)?;

    let report = match rules {
        Some(path) => {
            require_file(&path)?;
            let rules = RuleSet::load(&path)?;
            shape.compare_with_rules(&rules, old_source.as_ref(), new_source.as_ref())?
        }
        None => shape.compare(old_source.as_ref(), new_source.as_ref())?,
    };

    if let Some(ref path) = output {
        std::fs::write(path, report.to_json()?)?;
    }

    if json_output {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report, &old, &new, verbose);
        if let Some(path) = output {
            println!(
                "{} {}",
                "Report saved to".green().bold(),
                path.display().to_string().white()
            );
        }
    }

    if report.has_broken() {
        Ok(Outcome::Broken)
    } else {
        Ok(Outcome::Clean)
    }
}

fn print_report(report: &ComparisonReport, old: &Path, new: &Path, verbose: bool) {
    println!(
        "{} {} {} {}",
        "Comparing".cyan().bold(),
        old.display().to_string().white(),
        "->".cyan(),
        new.display().to_string().white()
    );
    println!();

    let acceptance = report.thresholds.acceptance_pass_rate;
    for comparison in report.parameters.values() {
        let status = match comparison.status {
            ParameterStatus::Consistent => comparison.status.label().green(),
            ParameterStatus::Degraded => comparison.status.label().yellow(),
            ParameterStatus::Broken => comparison.status.label().red().bold(),
            ParameterStatus::NewParameter | ParameterStatus::RemovedParameter => {
                comparison.status.label().blue()
            }
        };
        let marker = if comparison.low_confidence { "*" } else { " " };

        println!(
            "  {:24}{} {:18} {:>8} -> {:>8}  {}",
            comparison.parameter,
            marker,
            status,
            colored_rate(comparison.old.pass_rate, acceptance),
            colored_rate(comparison.new.pass_rate, acceptance),
            comparison.validator.dimmed()
        );

        if verbose && comparison.status != ParameterStatus::Consistent {
            for sample in &comparison.new.failing_samples {
                println!("      {} {}", "rejected".red(), sample);
            }
        }
    }

    let summary = &report.summary;
    println!();
    println!("{}", "Summary:".yellow().bold());
    println!("  Consistent: {}", summary.consistent.to_string().green());
    println!("  Degraded:   {}", summary.degraded.to_string().yellow());
    println!("  Broken:     {}", summary.broken.to_string().red());
    println!("  New:        {}", summary.new_parameters.to_string().blue());
    println!("  Removed:    {}", summary.removed_parameters.to_string().blue());
    if summary.low_confidence > 0 {
        println!(
            "  {} rules marked * were built from thin or ambiguous samples",
            summary.low_confidence.to_string().yellow()
        );
    }
    println!();

    if report.has_broken() {
        println!("{}", "The new version breaks the old data shape.".red().bold());
    } else {
        println!("{}", "The versions are data-compatible.".green().bold());
    }
}
