//! The column profiler: one pass per column, deciding semantic type and
//! summary statistics.

use std::collections::HashSet;

use crate::error::{DatalensError, Result};
use crate::input::DataTable;

use super::column::{ColumnProfile, NumericSummary};
use super::dataset::DatasetProfile;
use super::types::SemanticType;
use super::values;

/// Infers a [`DatasetProfile`] from parsed rows and headers.
///
/// Profiling is a pure function of the table contents: the same rows always
/// produce the same profile.
pub struct Profiler;

impl Profiler {
    pub fn new() -> Self {
        Self
    }

    /// Profile every column of a table.
    ///
    /// Fails outright on zero rows or zero columns; no partial profile is
    /// returned.
    pub fn profile(
        &self,
        table: &DataTable,
        dataset_version_id: impl Into<String>,
    ) -> Result<DatasetProfile> {
        if table.column_count() == 0 {
            return Err(DatalensError::NoColumns(
                "dataset has no columns to profile".to_string(),
            ));
        }
        if table.row_count() == 0 {
            return Err(DatalensError::EmptyDataset(
                "dataset has no rows to profile".to_string(),
            ));
        }

        let columns = table
            .headers
            .iter()
            .enumerate()
            .map(|(idx, name)| self.profile_column(table, idx, name))
            .collect();

        Ok(DatasetProfile {
            dataset_version_id: dataset_version_id.into(),
            row_count: table.row_count(),
            column_count: table.column_count(),
            columns,
        })
    }

    fn profile_column(&self, table: &DataTable, col_index: usize, name: &str) -> ColumnProfile {
        let row_count = table.row_count();

        let mut null_count = 0usize;
        let mut boolean_hits = 0usize;
        let mut date_hits = 0usize;
        let mut number_hits = 0usize;
        let mut distinct: HashSet<String> = HashSet::new();
        let mut numeric_values: Vec<f64> = Vec::new();

        for value in table.column_values(col_index) {
            if DataTable::is_null_value(value) {
                null_count += 1;
                continue;
            }

            if values::is_boolean_token(value) {
                boolean_hits += 1;
            }
            if values::parse_date(value).is_some() {
                date_hits += 1;
            }
            match values::parse_number(value) {
                Some(n) => {
                    number_hits += 1;
                    numeric_values.push(n);
                    // Separator-stripped form, so "1,000" and "1000" collapse.
                    distinct.insert(values::normalize_numeric(value));
                }
                None => {
                    distinct.insert(value.trim().to_string());
                }
            }
        }

        let non_null = row_count - null_count;
        let semantic_type = infer_type(non_null, boolean_hits, date_hits, number_hits);

        let numeric = if semantic_type == SemanticType::Number && !numeric_values.is_empty() {
            let min = numeric_values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = numeric_values
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            let mean = numeric_values.iter().sum::<f64>() / numeric_values.len() as f64;
            Some(NumericSummary { min, max, mean })
        } else {
            None
        };

        ColumnProfile {
            name: name.to_string(),
            semantic_type,
            null_count,
            null_ratio: null_count as f64 / row_count as f64,
            distinct_count: distinct.len(),
            numeric,
        }
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

/// First rule covering a strict majority of non-null values wins:
/// boolean, then date, then number, then the string fallback (which also
/// covers all-null columns).
fn infer_type(
    non_null: usize,
    boolean_hits: usize,
    date_hits: usize,
    number_hits: usize,
) -> SemanticType {
    if non_null == 0 {
        return SemanticType::String;
    }
    let majority = |hits: usize| hits * 2 > non_null;

    if majority(boolean_hits) {
        SemanticType::Boolean
    } else if majority(date_hits) {
        SemanticType::Date
    } else if majority(number_hits) {
        SemanticType::Number
    } else {
        SemanticType::String
    }
}
