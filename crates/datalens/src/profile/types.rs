//! Semantic type definitions.

use serde::{Deserialize, Serialize};

/// The inferred, meaning-bearing type of a column.
///
/// Decided once per dataset version by the profiler and immutable for that
/// version; downstream stages consume this tag rather than re-inferring from
/// raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Text/categorical values. The fallback type, including all-null columns.
    String,
    /// Numeric values (after grouping-separator stripping).
    Number,
    /// Values from a closed true/false vocabulary.
    Boolean,
    /// Calendar dates.
    Date,
    /// Not yet determined.
    Unknown,
}

impl SemanticType {
    /// Returns true if this type supports arithmetic aggregation.
    pub fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::Number)
    }

    /// Returns true if this type can serve as a grouping dimension.
    pub fn is_categorical(&self) -> bool {
        matches!(self, SemanticType::String | SemanticType::Date)
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SemanticType::String => "string",
            SemanticType::Number => "number",
            SemanticType::Boolean => "boolean",
            SemanticType::Date => "date",
            SemanticType::Unknown => "unknown",
        }
    }
}

impl Default for SemanticType {
    fn default() -> Self {
        SemanticType::Unknown
    }
}
