//! Typed artifacts: the immutable results of executed analyses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::guard::Operation;

use super::baseline::OutcomeAnalysis;
use super::drilldown::DrillDownComparison;

/// The result of a successfully executed analysis.
///
/// Immutable once created: an explanation may be attached afterwards, but the
/// computed values never change retroactively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Dataset version the computation ran against.
    pub dataset_version_id: String,
    /// When the artifact was generated.
    pub generated_at: DateTime<Utc>,
    /// Optional prose annotation from an explanation provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// The typed payload.
    #[serde(flatten)]
    pub data: ArtifactData,
}

impl Artifact {
    pub fn new(dataset_version_id: impl Into<String>, data: ArtifactData) -> Self {
        Self {
            dataset_version_id: dataset_version_id.into(),
            generated_at: Utc::now(),
            explanation: None,
            data,
        }
    }

    /// Attach prose without touching the computed payload.
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

/// Tagged union of artifact payloads; each variant carries only the fields
/// relevant to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactData {
    Scalar(ScalarResult),
    Breakdown(BreakdownResult),
    TimeSeries(TimeSeriesResult),
    Distribution(DrillDownComparison),
    OutcomeAnalysis(OutcomeAnalysis),
}

/// A single aggregated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarResult {
    pub operation: Operation,
    pub column: String,
    pub value: f64,
    /// Number of rows that contributed to the value.
    pub rows_considered: usize,
}

/// A metric broken down by a categorical dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownResult {
    pub metric: String,
    pub dimension: String,
    pub groups: Vec<CategoryBreakdown>,
}

/// One category of a breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub count: usize,
    /// Mean of the metric within the category; `None` when no metric value
    /// in the category was parseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_metric: Option<f64>,
}

/// Time bucket width for a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGranularity {
    Day,
    Month,
    Year,
}

impl TimeGranularity {
    pub fn label(&self) -> &'static str {
        match self {
            TimeGranularity::Day => "day",
            TimeGranularity::Month => "month",
            TimeGranularity::Year => "year",
        }
    }
}

/// A metric bucketed along a date column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesResult {
    pub metric: String,
    pub time_column: String,
    pub granularity: TimeGranularity,
    /// Buckets in ascending order.
    pub points: Vec<TimeSeriesPoint>,
}

/// One bucket of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub bucket: String,
    pub value: f64,
}
