//! Drilldown command - compare a metric between the two outcome groups.

use std::path::PathBuf;

use colored::Colorize;
use datalens::{Analyst, ArtifactData};

pub fn run(
    file: PathBuf,
    metric: String,
    dimension: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let analyst = Analyst::new();
    let artifact = analyst.drill_down(&file, &metric, dimension.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&artifact)?);
        return Ok(());
    }

    let ArtifactData::Distribution(ref comparison) = artifact.data else {
        return Err("unexpected artifact type from drill-down".into());
    };

    println!(
        "{} '{}' split by '{}'",
        "Drill-down".cyan().bold(),
        comparison.metric_column.white(),
        comparison.outcome_column.white()
    );

    for group in [&comparison.group_a, &comparison.group_b] {
        println!();
        println!(
            "{} (n={})",
            group.label.yellow().bold(),
            group.sample_size
        );
        println!(
            "  p25 {:.2}  p50 {:.2}  p75 {:.2}",
            group.percentiles.p25, group.percentiles.p50, group.percentiles.p75
        );
        for bucket in &group.histogram {
            let bar = "#".repeat((bucket.percentage / 5.0).round() as usize);
            println!("  {:24} {:5} {}", bucket.label, bucket.count, bar);
        }
        if let Some(ref breakdown) = group.secondary_breakdown {
            println!("  by dimension:");
            for category in breakdown {
                match category.average_metric {
                    Some(average) => println!(
                        "    {:20} {:5} rows, avg {:.2}",
                        category.category, category.count, average
                    ),
                    None => println!("    {:20} {:5} rows", category.category, category.count),
                }
            }
        }
    }

    Ok(())
}
