//! Drill-down: percentile and distribution comparison of a metric between
//! the two outcome groups, typically after a key difference caught the eye.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::{DataTable, Parser};
use crate::profile::{DatasetProfile, Profiler, SemanticType, values};

use super::artifact::CategoryBreakdown;
use super::baseline::{BaselineConfig, designate_outcome_column};
use super::stats::{self, HistogramBucket, Percentiles};

/// Why drill-down failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrillDownErrorCode {
    FileUnreadable,
    MetricNotFound,
    NoOutcomeColumn,
    DimensionNotFound,
    InsufficientSample,
}

/// Structured drill-down failure.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct DrillDownError {
    pub code: DrillDownErrorCode,
    pub message: String,
}

impl DrillDownError {
    fn new(code: DrillDownErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Drill-down configuration.
#[derive(Debug, Clone)]
pub struct DrillDownConfig {
    /// Minimum rows per outcome group for percentiles to be meaningful.
    pub min_group_size: usize,
    /// Buckets per group histogram.
    pub histogram_buckets: usize,
}

impl Default for DrillDownConfig {
    fn default() -> Self {
        Self {
            min_group_size: 5,
            histogram_buckets: 10,
        }
    }
}

/// Distribution of the metric within one outcome group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDistribution {
    /// e.g. `"churned=true"`.
    pub label: String,
    pub sample_size: usize,
    pub percentiles: Percentiles,
    /// Histogram over bucket edges shared with the other group.
    pub histogram: Vec<HistogramBucket>,
    /// Optional breakdown by a secondary categorical dimension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_breakdown: Option<Vec<CategoryBreakdown>>,
}

/// The two-group comparison produced by a drill-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillDownComparison {
    pub metric_column: String,
    pub outcome_column: String,
    pub group_a: GroupDistribution,
    pub group_b: GroupDistribution,
}

/// Computes drill-down comparisons from the raw dataset.
pub struct DrillDownService {
    parser: Parser,
    profiler: Profiler,
    config: DrillDownConfig,
}

impl DrillDownService {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            profiler: Profiler::new(),
            config: DrillDownConfig::default(),
        }
    }

    pub fn with_config(config: DrillDownConfig) -> Self {
        Self {
            parser: Parser::new(),
            profiler: Profiler::new(),
            config,
        }
    }

    /// Compare the metric's distribution between the two outcome groups,
    /// optionally broken down by a secondary categorical dimension.
    pub fn drill_down(
        &self,
        path: impl AsRef<Path>,
        metric_column: &str,
        secondary_dimension: Option<&str>,
    ) -> Result<DrillDownComparison, DrillDownError> {
        let (table, source) = self.parser.parse_file(path.as_ref()).map_err(|e| {
            DrillDownError::new(
                DrillDownErrorCode::FileUnreadable,
                format!("Could not read dataset file: {e}"),
            )
        })?;

        let profile = self
            .profiler
            .profile(&table, source.dataset_version_id)
            .map_err(|e| {
                DrillDownError::new(DrillDownErrorCode::InsufficientSample, e.to_string())
            })?;

        let metric_idx = self.metric_index(&table, &profile, metric_column)?;

        let outcome =
            designate_outcome_column(&profile, &BaselineConfig::default().outcome_hints)
                .ok_or_else(|| {
                    DrillDownError::new(
                        DrillDownErrorCode::NoOutcomeColumn,
                        "The dataset has no boolean outcome column to split groups by.",
                    )
                })?;
        let outcome_idx = table.column_index(&outcome.name).ok_or_else(|| {
            DrillDownError::new(
                DrillDownErrorCode::NoOutcomeColumn,
                format!("Outcome column '{}' is absent from the file.", outcome.name),
            )
        })?;

        let dimension_idx = match secondary_dimension {
            Some(name) => Some(table.column_index(name).ok_or_else(|| {
                DrillDownError::new(
                    DrillDownErrorCode::DimensionNotFound,
                    format!("Dimension column '{name}' not found in the dataset."),
                )
            })?),
            None => None,
        };

        let mut rows_a: Vec<usize> = Vec::new();
        let mut rows_b: Vec<usize> = Vec::new();
        for (row_idx, row) in table.rows.iter().enumerate() {
            match row.get(outcome_idx).and_then(|v| values::parse_bool(v)) {
                Some(true) => rows_a.push(row_idx),
                Some(false) => rows_b.push(row_idx),
                None => {}
            }
        }

        let values_a = metric_values(&table, &rows_a, metric_idx);
        let values_b = metric_values(&table, &rows_b, metric_idx);

        for (label, group) in [("true", &values_a), ("false", &values_b)] {
            if group.len() < self.config.min_group_size {
                return Err(DrillDownError::new(
                    DrillDownErrorCode::InsufficientSample,
                    format!(
                        "Group {}={} has only {} usable values; at least {} are needed.",
                        outcome.name,
                        label,
                        group.len(),
                        self.config.min_group_size
                    ),
                ));
            }
        }

        // Shared bucket edges keep the two histograms comparable.
        let combined_min = values_a
            .iter()
            .chain(values_b.iter())
            .copied()
            .fold(f64::INFINITY, f64::min);
        let combined_max = values_a
            .iter()
            .chain(values_b.iter())
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let group_a = self.group_distribution(
            &table,
            &outcome.name,
            true,
            values_a,
            &rows_a,
            metric_idx,
            dimension_idx,
            combined_min,
            combined_max,
        );
        let group_b = self.group_distribution(
            &table,
            &outcome.name,
            false,
            values_b,
            &rows_b,
            metric_idx,
            dimension_idx,
            combined_min,
            combined_max,
        );

        Ok(DrillDownComparison {
            metric_column: metric_column.to_string(),
            outcome_column: outcome.name.clone(),
            group_a,
            group_b,
        })
    }

    fn metric_index(
        &self,
        table: &DataTable,
        profile: &DatasetProfile,
        metric_column: &str,
    ) -> Result<usize, DrillDownError> {
        let column = profile.column(metric_column).ok_or_else(|| {
            DrillDownError::new(
                DrillDownErrorCode::MetricNotFound,
                format!(
                    "Metric column '{}' not found. Numeric columns: {}.",
                    metric_column,
                    profile
                        .numeric_columns()
                        .map(|c| c.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )
        })?;

        if column.semantic_type != SemanticType::Number {
            return Err(DrillDownError::new(
                DrillDownErrorCode::MetricNotFound,
                format!(
                    "Column '{}' is {}, not numeric; percentiles are undefined for it.",
                    metric_column,
                    column.semantic_type.label()
                ),
            ));
        }

        table.column_index(metric_column).ok_or_else(|| {
            DrillDownError::new(
                DrillDownErrorCode::MetricNotFound,
                format!("Column '{metric_column}' is absent from the dataset file."),
            )
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn group_distribution(
        &self,
        table: &DataTable,
        outcome_column: &str,
        truthy: bool,
        mut group_values: Vec<f64>,
        group_rows: &[usize],
        metric_idx: usize,
        dimension_idx: Option<usize>,
        range_min: f64,
        range_max: f64,
    ) -> GroupDistribution {
        group_values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let histogram = stats::histogram_with_range(
            &group_values,
            range_min,
            range_max,
            self.config.histogram_buckets,
        );

        let secondary_breakdown = dimension_idx
            .map(|dim_idx| secondary_breakdown(table, group_rows, dim_idx, metric_idx));

        GroupDistribution {
            label: format!("{outcome_column}={}", if truthy { "true" } else { "false" }),
            sample_size: group_values.len(),
            percentiles: stats::percentiles(&group_values),
            histogram,
            secondary_breakdown,
        }
    }
}

impl Default for DrillDownService {
    fn default() -> Self {
        Self::new()
    }
}

fn metric_values(table: &DataTable, rows: &[usize], metric_idx: usize) -> Vec<f64> {
    rows.iter()
        .filter_map(|&r| table.get(r, metric_idx).and_then(values::parse_number))
        .collect()
}

/// Per-category count and mean metric within one group's rows, sorted by
/// descending count, ties by category ascending.
fn secondary_breakdown(
    table: &DataTable,
    rows: &[usize],
    dimension_idx: usize,
    metric_idx: usize,
) -> Vec<CategoryBreakdown> {
    use indexmap::IndexMap;

    let mut accumulator: IndexMap<String, (usize, Vec<f64>)> = IndexMap::new();
    for &row_idx in rows {
        let Some(raw) = table.get(row_idx, dimension_idx) else {
            continue;
        };
        if DataTable::is_null_value(raw) {
            continue;
        }
        let entry = accumulator
            .entry(raw.trim().to_string())
            .or_insert((0, Vec::new()));
        entry.0 += 1;
        if let Some(number) = table.get(row_idx, metric_idx).and_then(values::parse_number) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn sample_csv() -> String {
        let mut csv = String::from("score,plan,churned\n");
        for i in 0..10 {
            csv.push_str(&format!("{},basic,true\n", 10 + i));
        }
        for i in 0..10 {
            csv.push_str(&format!("{},pro,false\n", 50 + i * 2));
        }
        csv
    }

    #[test]
    fn test_drill_down_percentiles() {
        let file = write_csv(&sample_csv());
        let comparison = DrillDownService::new()
            .drill_down(file.path(), "score", None)
            .unwrap();

        assert_eq!(comparison.outcome_column, "churned");
        assert_eq!(comparison.group_a.sample_size, 10);
        assert_eq!(comparison.group_b.sample_size, 10);

        // Group A holds 10..=19: p50 = 14.5 by linear interpolation.
        assert!((comparison.group_a.percentiles.p50 - 14.5).abs() < 1e-9);
        assert!(comparison.group_a.percentiles.p25 <= comparison.group_a.percentiles.p50);
        assert!(comparison.group_a.percentiles.p50 <= comparison.group_a.percentiles.p75);

        // Shared bucket edges: both histograms have the same label sequence.
        let labels_a: Vec<&str> = comparison
            .group_a
            .histogram
            .iter()
            .map(|b| b.label.as_str())
            .collect();
        let labels_b: Vec<&str> = comparison
            .group_b
            .histogram
            .iter()
            .map(|b| b.label.as_str())
            .collect();
        assert_eq!(labels_a, labels_b);
    }

    #[test]
    fn test_drill_down_secondary_breakdown() {
        let file = write_csv(&sample_csv());
        let comparison = DrillDownService::new()
            .drill_down(file.path(), "score", Some("plan"))
            .unwrap();

        let breakdown = comparison.group_a.secondary_breakdown.unwrap();
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].category, "basic");
        assert_eq!(breakdown[0].count, 10);
    }

    #[test]
    fn test_drill_down_metric_not_found() {
        let file = write_csv(&sample_csv());
        let err = DrillDownService::new()
            .drill_down(file.path(), "nonexistent", None)
            .unwrap_err();
        assert_eq!(err.code, DrillDownErrorCode::MetricNotFound);
        assert!(err.message.contains("score"));
    }

    #[test]
    fn test_drill_down_non_numeric_metric_rejected() {
        let file = write_csv(&sample_csv());
        let err = DrillDownService::new()
            .drill_down(file.path(), "plan", None)
            .unwrap_err();
        assert_eq!(err.code, DrillDownErrorCode::MetricNotFound);
    }

    #[test]
    fn test_drill_down_insufficient_sample() {
        let file = write_csv("score,churned\n1,true\n2,true\n3,false\n4,false\n5,false\n6,false\n7,false\n");
        let err = DrillDownService::new()
            .drill_down(file.path(), "score", None)
            .unwrap_err();
        assert_eq!(err.code, DrillDownErrorCode::InsufficientSample);
    }

    #[test]
    fn test_drill_down_no_outcome_column() {
        let file = write_csv("score,plan\n1,basic\n2,pro\n");
        let err = DrillDownService::new()
            .drill_down(file.path(), "score", None)
            .unwrap_err();
        assert_eq!(err.code, DrillDownErrorCode::NoOutcomeColumn);
    }
}
