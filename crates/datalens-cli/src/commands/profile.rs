//! Profile command - infer semantic types and statistics for a dataset.

use std::path::PathBuf;

use colored::Colorize;
use datalens::Analyst;

pub fn run(file: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let analyst = Analyst::new();
    let (profile, source) = analyst.profile(&file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns, {})",
        "Profiled".cyan().bold(),
        source.file.white(),
        profile.row_count,
        profile.column_count,
        source.format
    );
    println!("version {}", source.dataset_version_id.dimmed());
    println!();

    for column in &profile.columns {
        let type_label = match column.semantic_type {
            datalens::SemanticType::Number => "number".green(),
            datalens::SemanticType::Date => "date".blue(),
            datalens::SemanticType::Boolean => "boolean".magenta(),
            _ => column.semantic_type.label().normal(),
        };

        print!(
            "  {:24} {:10} {:4} distinct, {:.0}% null",
            column.name,
            type_label,
            column.distinct_count,
            column.null_ratio * 100.0
        );
        if let Some(numeric) = column.numeric {
            print!(
                "  (min {:.2}, max {:.2}, mean {:.2})",
                numeric.min, numeric.max, numeric.mean
            );
        }
        println!();
    }

    Ok(())
}
