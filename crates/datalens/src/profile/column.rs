//! Per-column profile and numeric summary.

use serde::{Deserialize, Serialize};

use super::types::SemanticType;

/// Summary statistics for a numeric column, nulls ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Profile of a single column within a dataset version.
///
/// The semantic type is decided once at profiling time and never changes for
/// that version; re-profiling a new version creates a new profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name, unique within the dataset version.
    pub name: String,
    /// Inferred semantic type.
    #[serde(default)]
    pub semantic_type: SemanticType,
    /// Number of null (empty) cells.
    pub null_count: usize,
    /// `null_count / row_count`; zero for an empty dataset never occurs
    /// because profiling an empty dataset fails outright.
    pub null_ratio: f64,
    /// Count of distinct non-null normalized values.
    pub distinct_count: usize,
    /// Present iff `semantic_type` is `Number`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

impl ColumnProfile {
    /// Whether this column can be aggregated arithmetically.
    pub fn is_numeric(&self) -> bool {
        self.semantic_type.is_numeric()
    }

    /// Whether this column is usable as a low-cardinality grouping dimension.
    pub fn is_low_cardinality(&self, min_distinct: usize, max_distinct: usize) -> bool {
        self.semantic_type == SemanticType::String
            && self.distinct_count >= min_distinct
            && self.distinct_count <= max_distinct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_cardinality_bounds() {
        let profile = ColumnProfile {
            name: "region".to_string(),
            semantic_type: SemanticType::String,
            null_count: 0,
            null_ratio: 0.0,
            distinct_count: 4,
            numeric: None,
        };
        assert!(profile.is_low_cardinality(2, 20));
        assert!(!profile.is_low_cardinality(5, 20));
        assert!(!profile.is_low_cardinality(2, 3));
    }
}
