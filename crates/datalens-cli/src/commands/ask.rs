//! Ask command - run the full question pipeline against a dataset.

use std::path::PathBuf;

use colored::Colorize;
use datalens::{Analyst, ArtifactData, MockExplainer, QuestionOutcome};

pub fn run(
    file: PathBuf,
    question: String,
    json: bool,
    mock_explain: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut analyst = Analyst::new();
    if mock_explain {
        analyst = analyst.with_explainer(MockExplainer::new());
    }

    let outcome = analyst.ask(&file, &question)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        QuestionOutcome::Answered {
            classification,
            artifact,
        } => {
            println!(
                "{} intent {} ({:.0}% confidence)",
                "Answered".green().bold(),
                classification.intent.label().white(),
                classification.confidence * 100.0
            );
            print_artifact_data(&artifact.data);
            if let Some(ref explanation) = artifact.explanation {
                println!();
                println!("{}", explanation.italic());
            }
        }
        QuestionOutcome::Blocked {
            block, explanation, ..
        } => {
            println!(
                "{} {} on '{}' ({})",
                "Blocked".red().bold(),
                block.attempted_operation.label(),
                block.column,
                block.semantic_type.label()
            );
            println!("{}", block.reason);
            let alternatives: Vec<&str> = block
                .suggested_alternatives
                .iter()
                .map(|op| op.describe())
                .collect();
            println!("Try instead: {}", alternatives.join(", ").yellow());
            if let Some(explanation) = explanation {
                println!();
                println!("{}", explanation.italic());
            }
        }
        QuestionOutcome::Unresolved { error, .. } => {
            println!("{} {}", "Unresolved".yellow().bold(), error.message);
        }
        QuestionOutcome::Unsupported { message, .. } => {
            println!("{} {}", "Unsupported".yellow().bold(), message);
        }
        QuestionOutcome::Failed { error, .. } => {
            println!("{} {}", "Failed".red().bold(), error.message);
        }
    }

    Ok(())
}

fn print_artifact_data(data: &ArtifactData) {
    match data {
        ArtifactData::Scalar(scalar) => {
            println!(
                "{} of '{}' = {} ({} rows)",
                scalar.operation.describe(),
                scalar.column,
                format!("{:.4}", scalar.value).white().bold(),
                scalar.rows_considered
            );
        }
        ArtifactData::Breakdown(breakdown) => {
            println!(
                "'{}' by '{}':",
                breakdown.metric.white().bold(),
                breakdown.dimension.white().bold()
            );
            for group in &breakdown.groups {
                match group.average_metric {
                    Some(average) => println!(
                        "  {:20} {:6} rows, avg {:.2}",
                        group.category, group.count, average
                    ),
                    None => println!("  {:20} {:6} rows", group.category, group.count),
                }
            }
        }
        ArtifactData::TimeSeries(series) => {
            println!(
                "'{}' per {} of '{}':",
                series.metric.white().bold(),
                series.granularity.label(),
                series.time_column
            );
            for point in &series.points {
                println!("  {:12} {:.2}", point.bucket, point.value);
            }
        }
        ArtifactData::Distribution(comparison) => {
            for group in [&comparison.group_a, &comparison.group_b] {
                println!(
                    "  {:16} n={:4}  p25 {:.2}  p50 {:.2}  p75 {:.2}",
                    group.label,
                    group.sample_size,
                    group.percentiles.p25,
                    group.percentiles.p50,
                    group.percentiles.p75
                );
            }
        }
        ArtifactData::OutcomeAnalysis(outcome) => {
            println!(
                "'{}' rate {:.1}%, {} key differences",
                outcome.outcome_column,
                outcome.overall_rate * 100.0,
                outcome.key_differences.len()
            );
        }
    }
}
