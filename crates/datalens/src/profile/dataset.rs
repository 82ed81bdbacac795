//! Dataset-level profile.

use serde::{Deserialize, Serialize};

use super::column::ColumnProfile;
use super::types::SemanticType;

/// Profile of an entire dataset version. Created at profiling time and
/// read-only afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    /// Version this profile describes.
    pub dataset_version_id: String,
    /// Number of data rows.
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// Column profiles in header order.
    pub columns: Vec<ColumnProfile>,
}

impl DatasetProfile {
    /// Get a column profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All column names in header order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns of a given semantic type, in header order.
    pub fn columns_of_type(
        &self,
        semantic_type: SemanticType,
    ) -> impl Iterator<Item = &ColumnProfile> {
        self.columns
            .iter()
            .filter(move |c| c.semantic_type == semantic_type)
    }

    /// Numeric columns, in header order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns_of_type(SemanticType::Number)
    }

    /// Date columns, in header order.
    pub fn date_columns(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns_of_type(SemanticType::Date)
    }

    /// Boolean columns, in header order.
    pub fn boolean_columns(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns_of_type(SemanticType::Boolean)
    }

    /// String columns usable as grouping dimensions.
    pub fn categorical_columns(
        &self,
        min_distinct: usize,
        max_distinct: usize,
    ) -> impl Iterator<Item = &ColumnProfile> {
        self.columns
            .iter()
            .filter(move |c| c.is_low_cardinality(min_distinct, max_distinct))
    }
}
