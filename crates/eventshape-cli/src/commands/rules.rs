//! Rules command - generate a rule set from a dataset and save it.

use std::path::PathBuf;

use colored::Colorize;
use eventshape::EventShape;

use super::{require_file, CommandResult, Outcome};

pub fn run(
    shape: &EventShape,
    file: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
) -> CommandResult {
    require_file(&file)?;

    println!(
        "{} {}",
        "Generating rules from".cyan().bold(),
        file.display().to_string().white()
    );

    let source = shape.open(&file)?;
    let profiles = shape.profile_source(source.as_ref())?;
    let rules = shape.generate_rules(&profiles);

    if verbose {
        println!();
        for rule in rules.iter() {
            let flag = if rule.low_confidence {
                "low confidence".yellow()
            } else {
                "".normal()
            };
            println!("  {:24} {:16} {}", rule.parameter, rule.kind(), flag);
        }
        println!();
    }

    let output_path = output.unwrap_or_else(|| {
        let mut p = file.clone();
        let stem = p.file_stem().unwrap_or_default().to_string_lossy();
        p.set_file_name(format!("{}.rules.json", stem));
        p
    });

    rules.save(&output_path)?;

    let low = rules.iter().filter(|r| r.low_confidence).count();
    println!(
        "Generated {} rules ({} low confidence)",
        rules.len().to_string().white().bold(),
        low.to_string().yellow()
    );
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );
    println!("Fingerprint: {}", rules.fingerprint()?.dimmed());

    Ok(Outcome::Clean)
}
