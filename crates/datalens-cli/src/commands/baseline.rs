//! Baseline command - run the three-phase report.

use std::path::PathBuf;

use colored::Colorize;
use datalens::Analyst;

pub fn run(file: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let analyst = Analyst::new();
    let analysis = analyst.baseline(&file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!(
        "{} {} rows, version {}",
        "Baseline".cyan().bold(),
        analysis.metadata.row_count,
        analysis.metadata.dataset_version_id.dimmed()
    );

    println!();
    println!("{}", "Phase A - metric summaries".yellow().bold());
    for summary in &analysis.phase_a.metric_summaries {
        println!(
            "  {:20} n={:5} mean {:10.2} min {:10.2} max {:10.2}",
            summary.column_name, summary.non_null_count, summary.mean, summary.min, summary.max
        );
    }

    println!();
    println!("{}", "Phase B - standard breakdowns".yellow().bold());
    if analysis.phase_b.breakdowns.is_empty() {
        println!("  (no qualifying categorical columns)");
    }
    for breakdown in &analysis.phase_b.breakdowns {
        println!(
            "  {} x {} ({} categories)",
            breakdown.metric_column,
            breakdown.categorical_column,
            breakdown.breakdowns.len()
        );
    }

    println!();
    println!("{}", "Phase C - outcome analysis".yellow().bold());
    match analysis.phase_c {
        Some(ref outcome) => {
            println!(
                "  outcome '{}', overall rate {:.1}%",
                outcome.outcome_column,
                outcome.overall_rate * 100.0
            );
            for difference in &outcome.key_differences {
                let relative = difference
                    .relative_difference
                    .map(|r| format!("{:+.1}%", r * 100.0))
                    .unwrap_or_else(|| "n/a".to_string());
                println!(
                    "  #{} {:20} {:10.2} vs {:10.2} ({} relative)",
                    difference.rank,
                    difference.metric_column,
                    difference.average_group_a,
                    difference.average_group_b,
                    relative
                );
            }
        }
        None => println!("  (no outcome column)"),
    }

    Ok(())
}
