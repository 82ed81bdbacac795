//! Property-based tests for the Datalens core.
//!
//! These verify that the deterministic stages hold their invariants on
//! arbitrary input:
//!
//! 1. **No panics**: profiler and classifier never crash on any input
//! 2. **Determinism**: same input always produces same output
//! 3. **Invariants**: ratios stay in range, ranks stay dense, the guard's
//!    alternatives never contain the blocked operation

use proptest::prelude::*;

use datalens::guard::{self, Operation, SemanticGuard, OPERATIONS};
use datalens::question::ResolvedColumn;
use datalens::{
    ColumnProfile, DataTable, Intent, IntentClassifier, MetricResolution, Profiler, SemanticType,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Arbitrary cell content, biased toward the shapes the profiler cares about.
fn cell_value() -> impl Strategy<Value = String> {
    prop_oneof![
        // Plain words
        "[a-zA-Z]{0,12}",
        // Integers and decimals
        "-?[0-9]{1,6}(\\.[0-9]{1,3})?",
        // Grouped numbers
        "[1-9],[0-9]{3}",
        // ISO-ish dates
        "20[0-9]{2}-[01][0-9]-[0-3][0-9]",
        // Boolean vocabulary
        prop_oneof![
            Just("true".to_string()),
            Just("false".to_string()),
            Just("yes".to_string()),
            Just("no".to_string()),
            Just("1".to_string()),
            Just("0".to_string()),
        ],
        // Empty (null)
        Just(String::new()),
    ]
}

/// A small table with 1-4 columns and 1-20 rows.
fn small_table() -> impl Strategy<Value = DataTable> {
    (1usize..=4, 1usize..=20).prop_flat_map(|(cols, rows)| {
        prop::collection::vec(prop::collection::vec(cell_value(), cols), rows).prop_map(
            move |rows| {
                let headers = (0..cols).map(|i| format!("col_{i}")).collect();
                DataTable::new(headers, rows, b',')
            },
        )
    })
}

fn semantic_type() -> impl Strategy<Value = SemanticType> {
    prop_oneof![
        Just(SemanticType::String),
        Just(SemanticType::Number),
        Just(SemanticType::Boolean),
        Just(SemanticType::Date),
        Just(SemanticType::Unknown),
    ]
}

fn intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        Just(Intent::AggregateAvg),
        Just(Intent::AggregateSum),
        Just(Intent::AggregateCount),
        Just(Intent::GroupBy),
        Just(Intent::TimeSeries),
        Just(Intent::Compare),
    ]
}

fn resolved_column(name: &str, semantic_type: SemanticType) -> ResolvedColumn {
    ResolvedColumn {
        column_name: name.to_string(),
        profile: ColumnProfile {
            name: name.to_string(),
            semantic_type,
            null_count: 0,
            null_ratio: 0.0,
            distinct_count: 3,
            numeric: None,
        },
    }
}

// =============================================================================
// Profiler properties
// =============================================================================

proptest! {
    #[test]
    fn profiling_never_panics_and_is_deterministic(table in small_table()) {
        let profiler = Profiler::new();
        let first = profiler.profile(&table, "v1").unwrap();
        let second = profiler.profile(&table, "v1").unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn profile_invariants_hold(table in small_table()) {
        let profile = Profiler::new().profile(&table, "v1").unwrap();

        prop_assert_eq!(profile.row_count, table.row_count());
        prop_assert_eq!(profile.columns.len(), profile.column_count);

        for column in &profile.columns {
            prop_assert!(column.null_count <= profile.row_count);
            prop_assert!(column.null_ratio >= 0.0 && column.null_ratio <= 1.0);
            prop_assert!(column.distinct_count <= profile.row_count - column.null_count);
            // The numeric summary appears exactly on Number columns with
            // parseable values.
            if column.semantic_type != SemanticType::Number {
                prop_assert!(column.numeric.is_none());
            }
            if let Some(numeric) = column.numeric {
                prop_assert!(numeric.min <= numeric.mean && numeric.mean <= numeric.max);
            }
        }
    }

    // The profiler never emits Unknown: string is the declared fallback.
    #[test]
    fn profiler_never_emits_unknown(table in small_table()) {
        let profile = Profiler::new().profile(&table, "v1").unwrap();
        for column in &profile.columns {
            prop_assert_ne!(column.semantic_type, SemanticType::Unknown);
        }
    }
}

// =============================================================================
// Classifier properties
// =============================================================================

proptest! {
    #[test]
    fn classifier_never_panics(question in "\\PC{0,200}") {
        let classifier = IntentClassifier::new();
        let first = classifier.classify(&question);
        let second = classifier.classify(&question);
        prop_assert_eq!(&first, &second);
        prop_assert!((0.0..=1.0).contains(&first.confidence));
    }
}

// =============================================================================
// Guard properties
// =============================================================================

proptest! {
    #[test]
    fn guard_alternatives_never_contain_blocked_operation(
        ty in semantic_type(),
        question_intent in intent(),
    ) {
        let resolution = MetricResolution {
            metric: resolved_column("m", ty),
            dimension: None,
            time_column: None,
        };
        if let Some(block) = SemanticGuard::new().validate(&resolution, question_intent, "v1") {
            prop_assert!(!block
                .suggested_alternatives
                .contains(&block.attempted_operation));
            prop_assert_eq!(block.column.as_str(), "m");
            // Every suggested alternative must itself pass the rule table.
            for op in &block.suggested_alternatives {
                prop_assert!(guard::allows(*op, block.semantic_type));
            }
        }
    }

    // Count is universal: no semantic type may block it.
    #[test]
    fn guard_always_allows_count(ty in semantic_type()) {
        let resolution = MetricResolution {
            metric: resolved_column("m", ty),
            dimension: None,
            time_column: None,
        };
        prop_assert!(SemanticGuard::new()
            .validate(&resolution, Intent::AggregateCount, "v1")
            .is_none());
    }
}

// =============================================================================
// Rule table enumeration
// =============================================================================

#[test]
fn rule_table_is_total() {
    // Every (operation, type) cell has a defined verdict, and alternatives
    // are consistent with the table.
    for ty in [
        SemanticType::String,
        SemanticType::Number,
        SemanticType::Boolean,
        SemanticType::Date,
        SemanticType::Unknown,
    ] {
        for op in OPERATIONS {
            let allowed = guard::allows(op, ty);
            let alternatives = guard::alternatives(ty, op);
            assert!(!alternatives.contains(&op));
            if !allowed {
                // Count is always a way out.
                assert!(alternatives.contains(&Operation::AggCount));
            }
        }
    }
}
