//! Analytic intents and classification results.

use serde::{Deserialize, Serialize};

/// The closed set of analytic operations a question can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Average of a metric column.
    AggregateAvg,
    /// Sum of a metric column.
    AggregateSum,
    /// Count of non-null values in a column.
    AggregateCount,
    /// Metric broken down by a categorical dimension.
    GroupBy,
    /// Metric bucketed along a date column.
    TimeSeries,
    /// Two groups of a dimension compared on a metric.
    Compare,
    /// No supported analytic intent was recognized.
    UnsupportedQuery,
}

impl Intent {
    /// Stable wire label.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::AggregateAvg => "aggregate_avg",
            Intent::AggregateSum => "aggregate_sum",
            Intent::AggregateCount => "aggregate_count",
            Intent::GroupBy => "group_by",
            Intent::TimeSeries => "time_series",
            Intent::Compare => "compare",
            Intent::UnsupportedQuery => "unsupported_query",
        }
    }

    /// Whether this intent needs a second, categorical column.
    pub fn needs_dimension(&self) -> bool {
        matches!(self, Intent::GroupBy | Intent::Compare)
    }

    /// Whether this intent needs a date column.
    pub fn needs_time_column(&self) -> bool {
        matches!(self, Intent::TimeSeries)
    }
}

/// Result of classifying a question. Transient; computed per question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,
    /// Confidence in the classification, 0.0 to 1.0.
    pub confidence: f64,
    /// A quoted literal pulled from the question, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_value: Option<String>,
}
