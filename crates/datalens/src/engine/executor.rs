//! Execution engine: computes an approved operation against the
//! authoritative dataset file.

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::guard::Operation;
use crate::input::{DataTable, Parser};
use crate::profile::values;
use crate::question::{Intent, MetricResolution};

use super::artifact::{
    Artifact, ArtifactData, BreakdownResult, CategoryBreakdown, ScalarResult, TimeGranularity,
    TimeSeriesPoint, TimeSeriesResult,
};
use super::stats;

/// Why execution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionErrorCode {
    /// The dataset file could not be read.
    FileUnreadable,
    /// A resolved column is absent from the file: the dataset no longer
    /// matches its profile.
    ColumnMissing,
    /// The resolution lacks a column the intent requires.
    IncompleteResolution,
    /// The intent has no executable operation.
    UnsupportedIntent,
    /// No parseable values to aggregate.
    NoUsableValues,
}

/// Structured execution failure.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ExecutionError {
    pub code: ExecutionErrorCode,
    pub message: String,
}

impl ExecutionError {
    pub(crate) fn new(code: ExecutionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Executes validated operations. Always re-reads the dataset file so the
/// artifact reflects the exact rows, never the profiler's cached statistics.
pub struct ExecutionEngine {
    parser: Parser,
}

impl ExecutionEngine {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    pub fn with_parser(parser: Parser) -> Self {
        Self { parser }
    }

    /// Compute the operation implied by `intent` over the resolved columns.
    pub fn execute(
        &self,
        path: impl AsRef<Path>,
        intent: Intent,
        resolution: &MetricResolution,
    ) -> Result<Artifact, ExecutionError> {
        let (table, source) = self.parser.parse_file(path.as_ref()).map_err(|e| {
            ExecutionError::new(
                ExecutionErrorCode::FileUnreadable,
                format!("Could not read dataset file: {e}"),
            )
        })?;

        let metric_idx = column_index(&table, &resolution.metric.column_name)?;

        let data = match intent {
            Intent::AggregateAvg | Intent::AggregateSum | Intent::AggregateCount => {
                self.execute_scalar(&table, intent, &resolution.metric.column_name, metric_idx)?
            }
            Intent::GroupBy | Intent::Compare => {
                let dimension = resolution.dimension.as_ref().ok_or_else(|| {
                    ExecutionError::new(
                        ExecutionErrorCode::IncompleteResolution,
                        "Grouping requires a resolved dimension column.",
                    )
                })?;
                let dimension_idx = column_index(&table, &dimension.column_name)?;
                ArtifactData::Breakdown(BreakdownResult {
                    metric: resolution.metric.column_name.clone(),
                    dimension: dimension.column_name.clone(),
                    groups: group_breakdown(&table, dimension_idx, metric_idx),
                })
            }
            Intent::TimeSeries => {
                let time_column = resolution.time_column.as_ref().ok_or_else(|| {
                    ExecutionError::new(
                        ExecutionErrorCode::IncompleteResolution,
                        "A time series requires a resolved time column.",
                    )
                })?;
                let time_idx = column_index(&table, &time_column.column_name)?;
                self.execute_time_series(
                    &table,
                    &resolution.metric.column_name,
                    metric_idx,
                    &time_column.column_name,
                    time_idx,
                )?
            }
            Intent::UnsupportedQuery => {
                return Err(ExecutionError::new(
                    ExecutionErrorCode::UnsupportedIntent,
                    "An unsupported question cannot be executed.",
                ));
            }
        };

        Ok(Artifact::new(source.dataset_version_id, data))
    }

    fn execute_scalar(
        &self,
        table: &DataTable,
        intent: Intent,
        column: &str,
        column_idx: usize,
    ) -> Result<ArtifactData, ExecutionError> {
        if intent == Intent::AggregateCount {
            let count = table
                .column_values(column_idx)
                .filter(|v| !DataTable::is_null_value(v))
                .count();
            return Ok(ArtifactData::Scalar(ScalarResult {
                operation: Operation::AggCount,
                column: column.to_string(),
                value: count as f64,
                rows_considered: count,
            }));
        }

        let numbers: Vec<f64> = table
            .column_values(column_idx)
            .filter_map(values::parse_number)
            .collect();

        if numbers.is_empty() {
            return Err(ExecutionError::new(
                ExecutionErrorCode::NoUsableValues,
                format!("Column '{column}' has no numeric values to aggregate."),
            ));
        }

        let (operation, value) = match intent {
            Intent::AggregateAvg => (
                Operation::AggAvg,
                numbers.iter().sum::<f64>() / numbers.len() as f64,
            ),
            Intent::AggregateSum => (Operation::AggSum, numbers.iter().sum::<f64>()),
            _ => unreachable!("scalar execution only handles aggregate intents"),
        };

        Ok(ArtifactData::Scalar(ScalarResult {
            operation,
            column: column.to_string(),
            value,
            rows_considered: numbers.len(),
        }))
    }

    fn execute_time_series(
        &self,
        table: &DataTable,
        metric: &str,
        metric_idx: usize,
        time_column: &str,
        time_idx: usize,
    ) -> Result<ArtifactData, ExecutionError> {
        let mut points: Vec<(chrono::NaiveDate, f64)> = Vec::new();
        for row in &table.rows {
            let date = row.get(time_idx).and_then(|v| values::parse_date(v));
            let number = row.get(metric_idx).and_then(|v| values::parse_number(v));
            if let (Some(date), Some(number)) = (date, number) {
                points.push((date, number));
            }
        }

        if points.is_empty() {
            return Err(ExecutionError::new(
                ExecutionErrorCode::NoUsableValues,
                format!(
                    "No rows have both a valid '{time_column}' date and a numeric '{metric}' value."
                ),
            ));
        }

        let min_date = points.iter().map(|(d, _)| *d).min().unwrap();
        let max_date = points.iter().map(|(d, _)| *d).max().unwrap();
        let granularity = infer_granularity(min_date, max_date);

        // BTreeMap keys are the bucket labels; their lexicographic order is
        // chronological for all three formats.
        let mut buckets: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for (date, number) in points {
            let label = bucket_label(date, granularity);
            let entry = buckets.entry(label).or_insert((0.0, 0));
            entry.0 += number;
            entry.1 += 1;
        }

        Ok(ArtifactData::TimeSeries(TimeSeriesResult {
            metric: metric.to_string(),
            time_column: time_column.to_string(),
            granularity,
            points: buckets
                .into_iter()
                .map(|(bucket, (sum, count))| TimeSeriesPoint {
                    bucket,
                    value: sum / count as f64,
                })
                .collect(),
        }))
    }
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn column_index(table: &DataTable, name: &str) -> Result<usize, ExecutionError> {
    table.column_index(name).ok_or_else(|| {
        ExecutionError::new(
            ExecutionErrorCode::ColumnMissing,
            format!("Column '{name}' was profiled but is absent from the dataset file."),
        )
    })
}

/// Breakdown of a metric by a dimension: per-category count and mean metric,
/// sorted by descending count, ties by category ascending.
pub(crate) fn group_breakdown(
    table: &DataTable,
    dimension_idx: usize,
    metric_idx: usize,
) -> Vec<CategoryBreakdown> {
    let mut accumulator: IndexMap<String, (usize, Vec<f64>)> = IndexMap::new();

    for row in &table.rows {
        let Some(raw) = row.get(dimension_idx) else {
            continue;
        };
        if DataTable::is_null_value(raw) {
            continue;
        }
        let entry = accumulator
            .entry(raw.trim().to_string())
            .or_insert((0, Vec::new()));
        entry.0 += 1;
        if let Some(number) = row.get(metric_idx).and_then(|v| values::parse_number(v)) {
            entry.1.push(number);
        }
    }

    let mut groups: Vec<CategoryBreakdown> = accumulator
        .into_iter()
        .map(|(category, (count, numbers))| CategoryBreakdown {
            category,
            count,
            average_metric: stats::mean(&numbers),
        })
        .collect();

    groups.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
    });
    groups
}

fn infer_granularity(min: chrono::NaiveDate, max: chrono::NaiveDate) -> TimeGranularity {
    let span_days = (max - min).num_days();
    if span_days <= 62 {
        TimeGranularity::Day
    } else if span_days <= 731 {
        TimeGranularity::Month
    } else {
        TimeGranularity::Year
    }
}

fn bucket_label(date: chrono::NaiveDate, granularity: TimeGranularity) -> String {
    match granularity {
        TimeGranularity::Day => date.format("%Y-%m-%d").to_string(),
        TimeGranularity::Month => date.format("%Y-%m").to_string(),
        TimeGranularity::Year => date.format("%Y").to_string(),
    }
}
