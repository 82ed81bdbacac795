//! Semantic operation guard: the correctness backstop between resolution and
//! execution. The rule table below is the single source of truth for which
//! operation makes real-world sense on which semantic type.

use serde::{Deserialize, Serialize};

use crate::profile::SemanticType;
use crate::question::{Intent, MetricResolution};

/// Operations the guard rules over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    AggAvg,
    AggSum,
    AggCount,
    GroupBy,
    TimeBucket,
}

/// Every operation, in rule-table order.
pub const OPERATIONS: [Operation; 5] = [
    Operation::AggAvg,
    Operation::AggSum,
    Operation::AggCount,
    Operation::GroupBy,
    Operation::TimeBucket,
];

impl Operation {
    /// Stable wire label.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::AggAvg => "AGG_AVG",
            Operation::AggSum => "AGG_SUM",
            Operation::AggCount => "AGG_COUNT",
            Operation::GroupBy => "GROUP_BY",
            Operation::TimeBucket => "TIME_BUCKET",
        }
    }

    /// Human verb for messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Operation::AggAvg => "average",
            Operation::AggSum => "sum",
            Operation::AggCount => "count",
            Operation::GroupBy => "group by",
            Operation::TimeBucket => "bucket over time",
        }
    }
}

/// A blocked operation. Absence of a block (`None` from
/// [`SemanticGuard::validate`]) is the only proceed signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardBlock {
    /// The column the operation was attempted on.
    pub column: String,
    /// That column's inferred semantic type.
    pub semantic_type: SemanticType,
    /// The operation that was blocked.
    pub attempted_operation: Operation,
    /// Why the operation lacks real-world meaning for this type.
    pub reason: String,
    /// Operations that are valid for this column's type, excluding the
    /// blocked one.
    pub suggested_alternatives: Vec<Operation>,
    /// Dataset version the verdict applies to.
    pub dataset_version_id: String,
}

/// The operation × semantic-type rule table, kept as one exhaustive match so
/// it can be enumerated and unit-tested cell by cell.
pub fn allows(operation: Operation, semantic_type: SemanticType) -> bool {
    use Operation::*;
    use SemanticType::*;

    match (operation, semantic_type) {
        (AggAvg, Number) => true,
        (AggAvg, _) => false,

        (AggSum, Number) => true,
        (AggSum, _) => false,

        // Counting non-null values is meaningful for every type.
        (AggCount, _) => true,

        (GroupBy, String) | (GroupBy, Date) => true,
        (GroupBy, _) => false,

        (TimeBucket, Date) => true,
        (TimeBucket, _) => false,
    }
}

/// Valid operations for a semantic type, excluding the one that was blocked.
pub fn alternatives(semantic_type: SemanticType, excluding: Operation) -> Vec<Operation> {
    OPERATIONS
        .iter()
        .copied()
        .filter(|&op| op != excluding && allows(op, semantic_type))
        .collect()
}

fn block_reason(operation: Operation, semantic_type: SemanticType, column: &str) -> String {
    use Operation::*;
    use SemanticType::*;

    match (operation, semantic_type) {
        (AggAvg, Date) | (AggSum, Date) => format!(
            "'{column}' holds calendar dates; the {} of dates is not a meaningful quantity.",
            operation.describe()
        ),
        (AggAvg, _) => format!(
            "'{column}' holds {} values; averaging them has no arithmetic meaning.",
            semantic_type.label()
        ),
        (AggSum, _) => format!(
            "'{column}' holds {} values; summing them has no arithmetic meaning.",
            semantic_type.label()
        ),
        (GroupBy, Number) => format!(
            "'{column}' is a continuous number; grouping by every distinct value does not form meaningful categories."
        ),
        (GroupBy, _) => format!(
            "'{column}' holds {} values, which do not form grouping categories.",
            semantic_type.label()
        ),
        (TimeBucket, _) => format!(
            "'{column}' holds {} values, which cannot be placed on a timeline.",
            semantic_type.label()
        ),
        (AggCount, _) => unreachable!("AGG_COUNT is allowed on every semantic type"),
    }
}

/// Validates resolved operations against the rule table.
pub struct SemanticGuard;

impl SemanticGuard {
    pub fn new() -> Self {
        Self
    }

    /// Check every operation implied by the intent against the resolved
    /// columns. The metric is evaluated first; its failure short-circuits
    /// before the dimension or time column is looked at. `None` means
    /// approved.
    pub fn validate(
        &self,
        resolution: &MetricResolution,
        intent: Intent,
        dataset_version_id: &str,
    ) -> Option<GuardBlock> {
        let metric_operation = match intent {
            Intent::AggregateAvg => Operation::AggAvg,
            Intent::AggregateSum => Operation::AggSum,
            Intent::AggregateCount => Operation::AggCount,
            // Grouping intents average the metric per category; time series
            // average it per bucket.
            Intent::GroupBy | Intent::Compare | Intent::TimeSeries => Operation::AggAvg,
            Intent::UnsupportedQuery => return None,
        };

        if let Some(block) = self.check(
            &resolution.metric.column_name,
            resolution.metric.profile.semantic_type,
            metric_operation,
            dataset_version_id,
        ) {
            return Some(block);
        }

        if let Some(ref dimension) = resolution.dimension {
            if let Some(block) = self.check(
                &dimension.column_name,
                dimension.profile.semantic_type,
                Operation::GroupBy,
                dataset_version_id,
            ) {
                return Some(block);
            }
        }

        if let Some(ref time_column) = resolution.time_column {
            if let Some(block) = self.check(
                &time_column.column_name,
                time_column.profile.semantic_type,
                Operation::TimeBucket,
                dataset_version_id,
            ) {
                return Some(block);
            }
        }

        None
    }

    fn check(
        &self,
        column: &str,
        semantic_type: SemanticType,
        operation: Operation,
        dataset_version_id: &str,
    ) -> Option<GuardBlock> {
        if allows(operation, semantic_type) {
            return None;
        }
        Some(GuardBlock {
            column: column.to_string(),
            semantic_type,
            attempted_operation: operation,
            reason: block_reason(operation, semantic_type, column),
            suggested_alternatives: alternatives(semantic_type, operation),
            dataset_version_id: dataset_version_id.to_string(),
        })
    }
}

impl Default for SemanticGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ColumnProfile, NumericSummary};
    use crate::question::ResolvedColumn;

    fn resolved(name: &str, semantic_type: SemanticType) -> ResolvedColumn {
        ResolvedColumn {
            column_name: name.to_string(),
            profile: ColumnProfile {
                name: name.to_string(),
                semantic_type,
                null_count: 0,
                null_ratio: 0.0,
                distinct_count: 3,
                numeric: matches!(semantic_type, SemanticType::Number).then(|| NumericSummary {
                    min: 0.0,
                    max: 1.0,
                    mean: 0.5,
                }),
            },
        }
    }

    fn resolution(metric: ResolvedColumn, dimension: Option<ResolvedColumn>) -> MetricResolution {
        MetricResolution {
            metric,
            dimension,
            time_column: None,
        }
    }

    #[test]
    fn test_rule_table_cells() {
        use Operation::*;
        use SemanticType::*;

        assert!(allows(AggAvg, Number));
        assert!(!allows(AggAvg, Date));
        assert!(!allows(AggAvg, String));
        assert!(!allows(AggAvg, Boolean));

        assert!(allows(AggSum, Number));
        assert!(!allows(AggSum, Date));

        for ty in [Number, Date, String, Boolean, Unknown] {
            assert!(allows(AggCount, ty));
        }

        assert!(allows(GroupBy, Date));
        assert!(allows(GroupBy, String));
        assert!(!allows(GroupBy, Number));
        assert!(!allows(GroupBy, Boolean));

        assert!(allows(TimeBucket, Date));
        assert!(!allows(TimeBucket, String));
        assert!(!allows(TimeBucket, Boolean));
        assert!(!allows(TimeBucket, Number));
    }

    #[test]
    fn test_block_average_of_date() {
        let guard = SemanticGuard::new();
        let res = resolution(resolved("signup_date", SemanticType::Date), None);
        let block = guard
            .validate(&res, Intent::AggregateAvg, "v1")
            .expect("average of a date must be blocked");

        assert_eq!(block.column, "signup_date");
        assert_eq!(block.semantic_type, SemanticType::Date);
        assert_eq!(block.attempted_operation, Operation::AggAvg);
        assert!(!block.suggested_alternatives.is_empty());
        assert!(!block.suggested_alternatives.contains(&Operation::AggAvg));
        assert!(!block.suggested_alternatives.contains(&Operation::AggSum));
        assert!(block.suggested_alternatives.contains(&Operation::AggCount));
    }

    #[test]
    fn test_allow_valid_operations() {
        let guard = SemanticGuard::new();

        let numeric = resolution(resolved("revenue", SemanticType::Number), None);
        assert!(guard.validate(&numeric, Intent::AggregateAvg, "v1").is_none());
        assert!(guard.validate(&numeric, Intent::AggregateSum, "v1").is_none());

        for ty in [
            SemanticType::Number,
            SemanticType::Date,
            SemanticType::String,
            SemanticType::Boolean,
        ] {
            let res = resolution(resolved("col", ty), None);
            assert!(guard.validate(&res, Intent::AggregateCount, "v1").is_none());
        }
    }

    #[test]
    fn test_metric_failure_short_circuits_dimension() {
        let guard = SemanticGuard::new();
        // Metric invalid for averaging AND dimension invalid for grouping:
        // the block must name the metric.
        let res = resolution(
            resolved("signup_date", SemanticType::Date),
            Some(resolved("score", SemanticType::Number)),
        );
        let block = guard.validate(&res, Intent::GroupBy, "v1").unwrap();
        assert_eq!(block.column, "signup_date");
        assert_eq!(block.attempted_operation, Operation::AggAvg);
    }

    #[test]
    fn test_dimension_checked_after_valid_metric() {
        let guard = SemanticGuard::new();
        let res = resolution(
            resolved("revenue", SemanticType::Number),
            Some(resolved("score", SemanticType::Number)),
        );
        let block = guard.validate(&res, Intent::GroupBy, "v1").unwrap();
        assert_eq!(block.column, "score");
        assert_eq!(block.attempted_operation, Operation::GroupBy);
    }

    #[test]
    fn test_guard_pass_is_none() {
        let guard = SemanticGuard::new();
        let res = MetricResolution {
            metric: resolved("revenue", SemanticType::Number),
            dimension: Some(resolved("region", SemanticType::String)),
            time_column: None,
        };
        assert!(guard.validate(&res, Intent::GroupBy, "v1").is_none());
    }
}
