//! Validate command - apply a saved rule set to a dataset.

use std::path::PathBuf;

use colored::Colorize;
use eventshape::{EventShape, RuleSet};

use super::{colored_rate, require_file, CommandResult, Outcome};

pub fn run(
    shape: &EventShape,
    file: PathBuf,
    rules_path: PathBuf,
    json_output: bool,
    verbose: bool,
) -> CommandResult {
    require_file(&file)?;
    require_file(&rules_path)?;

    let rules = RuleSet::load(&rules_path)?;
    let source = shape.open(&file)?;
    let results = shape.validate_source(&rules, source.as_ref())?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(Outcome::Clean);
    }

    println!(
        "{} {} {} {}",
        "Validating".cyan().bold(),
        file.display().to_string().white(),
        "against".cyan().bold(),
        rules_path.display().to_string().white()
    );
    println!();

    let acceptance = shape.config().acceptance_pass_rate;
    for result in results.values() {
        let rate = if result.zero_sample {
            "no values".dimmed()
        } else {
            colored_rate(result.pass_rate, acceptance)
        };
        println!(
            "  {:24} {:16} {:>10}  {}/{}",
            result.parameter, result.validator, rate, result.passed, result.total
        );

        if verbose {
            for sample in &result.failing_samples {
                println!("      {} {}", "rejected".red(), sample);
            }
        }
    }

    let failing = results
        .values()
        .filter(|r| !r.zero_sample && r.pass_rate < acceptance)
        .count();
    println!();
    if failing == 0 {
        println!("{}", "All parameters meet the acceptance rate.".green().bold());
    } else {
        println!(
            "{} parameters below the acceptance rate of {:.0}%",
            failing.to_string().red().bold(),
            acceptance * 100.0
        );
    }

    Ok(Outcome::Clean)
}
