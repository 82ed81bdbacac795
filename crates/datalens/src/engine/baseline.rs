//! Baseline analysis: a fixed three-phase deterministic report computed once
//! per dataset version, independent of any user question.

use std::cmp::Ordering;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::{DataTable, Parser};
use crate::profile::{ColumnProfile, DatasetProfile, values};

use super::artifact::CategoryBreakdown;
use super::executor::{ExecutionError, ExecutionErrorCode, column_index, group_breakdown};
use super::stats::{self, HistogramBucket};

/// Thresholds for the baseline report.
#[derive(Debug, Clone)]
pub struct BaselineConfig {
    /// Buckets per metric histogram.
    pub histogram_buckets: usize,
    /// Minimum distinct values for a categorical column to be broken down.
    pub min_distinct: usize,
    /// Maximum distinct values for a categorical column to be broken down.
    pub max_distinct: usize,
    /// Name fragments that mark a boolean column as the outcome column.
    pub outcome_hints: Vec<String>,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            histogram_buckets: 10,
            min_distinct: 2,
            max_distinct: 20,
            outcome_hints: ["outcome", "churn", "converted", "success", "active", "retained", "won"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Summary of one numeric column (Phase A).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub column_name: String,
    pub row_count: usize,
    pub non_null_count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub distribution: Vec<HistogramBucket>,
}

/// Phase A payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummaryPhase {
    pub metric_summaries: Vec<MetricSummary>,
}

/// One numeric × categorical pairing (Phase B).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardBreakdown {
    pub categorical_column: String,
    pub metric_column: String,
    pub breakdowns: Vec<CategoryBreakdown>,
}

/// Phase B payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownPhase {
    pub breakdowns: Vec<StandardBreakdown>,
}

/// Outcome rate within one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOutcomeRate {
    pub category: String,
    pub count: usize,
    pub rate: f64,
}

/// Outcome rate broken down by one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRateBreakdown {
    pub column: String,
    pub rates: Vec<CategoryOutcomeRate>,
}

/// How strongly one numeric metric separates the two outcome groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDifference {
    pub metric_column: String,
    /// Mean within the outcome-true group.
    pub average_group_a: f64,
    /// Mean within the outcome-false group.
    pub average_group_b: f64,
    pub absolute_difference: f64,
    /// `absolute_difference / average_group_b`; `None` when the baseline
    /// group's mean is zero rather than an infinity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_difference: Option<f64>,
    /// 1-based rank by descending absolute relative difference.
    pub rank: usize,
}

/// Phase C payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeAnalysis {
    pub outcome_column: String,
    /// Share of rows with a truthy outcome, over rows where the outcome
    /// parses at all.
    pub overall_rate: f64,
    pub rates_by_category: Vec<OutcomeRateBreakdown>,
    pub key_differences: Vec<KeyDifference>,
}

/// Provenance for a baseline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineMetadata {
    pub dataset_version_id: String,
    pub row_count: usize,
    /// The only field that varies between identical runs.
    pub analyzed_at: DateTime<Utc>,
}

/// The full three-phase report. Regenerated wholesale when a dataset version
/// changes; never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineAnalysis {
    pub phase_a: MetricSummaryPhase,
    pub phase_b: BreakdownPhase,
    /// `None` when the dataset has no outcome column; never fabricated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_c: Option<OutcomeAnalysis>,
    pub metadata: BaselineMetadata,
}

/// Runs the three-phase baseline report.
pub struct BaselineEngine {
    parser: Parser,
    config: BaselineConfig,
}

impl BaselineEngine {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            config: BaselineConfig::default(),
        }
    }

    pub fn with_config(config: BaselineConfig) -> Self {
        Self {
            parser: Parser::new(),
            config,
        }
    }

    /// Run all three phases against the authoritative file.
    pub fn run(
        &self,
        profile: &DatasetProfile,
        path: impl AsRef<Path>,
    ) -> Result<BaselineAnalysis, ExecutionError> {
        let (table, source) = self.parser.parse_file(path.as_ref()).map_err(|e| {
            ExecutionError::new(
                ExecutionErrorCode::FileUnreadable,
                format!("Could not read dataset file: {e}"),
            )
        })?;

        let phase_a = self.metric_summaries(profile, &table)?;
        let phase_b = self.standard_breakdowns(profile, &table)?;
        let phase_c = self.outcome_analysis(profile, &table)?;

        Ok(BaselineAnalysis {
            phase_a,
            phase_b,
            phase_c,
            metadata: BaselineMetadata {
                dataset_version_id: source.dataset_version_id,
                row_count: table.row_count(),
                analyzed_at: Utc::now(),
            },
        })
    }

    /// Phase A: per-metric summary with a fixed-bucket histogram.
    fn metric_summaries(
        &self,
        profile: &DatasetProfile,
        table: &DataTable,
    ) -> Result<MetricSummaryPhase, ExecutionError> {
        let mut metric_summaries = Vec::new();

        for column in profile.numeric_columns() {
            let idx = column_index(table, &column.name)?;
            let numbers: Vec<f64> = table
                .column_values(idx)
                .filter_map(values::parse_number)
                .collect();
            let non_null_count = table
                .column_values(idx)
                .filter(|v| !DataTable::is_null_value(v))
                .count();

            let (min, max, mean) = if numbers.is_empty() {
                (0.0, 0.0, 0.0)
            } else {
                (
                    numbers.iter().copied().fold(f64::INFINITY, f64::min),
                    numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    numbers.iter().sum::<f64>() / numbers.len() as f64,
                )
            };

            metric_summaries.push(MetricSummary {
                column_name: column.name.clone(),
                row_count: table.row_count(),
                non_null_count,
                mean,
                min,
                max,
                distribution: stats::histogram(&numbers, self.config.histogram_buckets),
            });
        }

        Ok(MetricSummaryPhase { metric_summaries })
    }

    /// Phase B: every numeric metric crossed with every low-cardinality
    /// categorical column.
    fn standard_breakdowns(
        &self,
        profile: &DatasetProfile,
        table: &DataTable,
    ) -> Result<BreakdownPhase, ExecutionError> {
        let mut breakdowns = Vec::new();

        for categorical in
            profile.categorical_columns(self.config.min_distinct, self.config.max_distinct)
        {
            let dimension_idx = column_index(table, &categorical.name)?;
            for metric in profile.numeric_columns() {
                let metric_idx = column_index(table, &metric.name)?;
                breakdowns.push(StandardBreakdown {
                    categorical_column: categorical.name.clone(),
                    metric_column: metric.name.clone(),
                    breakdowns: group_breakdown(table, dimension_idx, metric_idx),
                });
            }
        }

        Ok(BreakdownPhase { breakdowns })
    }

    /// Phase C: outcome-group comparison, only when an outcome column exists.
    fn outcome_analysis(
        &self,
        profile: &DatasetProfile,
        table: &DataTable,
    ) -> Result<Option<OutcomeAnalysis>, ExecutionError> {
        let Some(outcome) = designate_outcome_column(profile, &self.config.outcome_hints) else {
            return Ok(None);
        };
        let outcome_idx = column_index(table, &outcome.name)?;

        // Row indices with a parseable outcome, split into the two groups.
        let mut group_a: Vec<usize> = Vec::new();
        let mut group_b: Vec<usize> = Vec::new();
        for (row_idx, row) in table.rows.iter().enumerate() {
            match row.get(outcome_idx).and_then(|v| values::parse_bool(v)) {
                Some(true) => group_a.push(row_idx),
                Some(false) => group_b.push(row_idx),
                None => {}
            }
        }

        let decided = group_a.len() + group_b.len();
        if decided == 0 {
            return Ok(None);
        }
        let overall_rate = group_a.len() as f64 / decided as f64;

        let mut rates_by_category = Vec::new();
        for categorical in
            profile.categorical_columns(self.config.min_distinct, self.config.max_distinct)
        {
            let idx = column_index(table, &categorical.name)?;
            rates_by_category.push(OutcomeRateBreakdown {
                column: categorical.name.clone(),
                rates: outcome_rates_by_category(table, idx, outcome_idx),
            });
        }

        let mut key_differences = Vec::new();
        for metric in profile.numeric_columns() {
            let idx = column_index(table, &metric.name)?;
            let average_of = |rows: &[usize]| {
                let numbers: Vec<f64> = rows
                    .iter()
                    .filter_map(|&r| table.get(r, idx).and_then(values::parse_number))
                    .collect();
                stats::mean(&numbers)
            };
            let (Some(average_group_a), Some(average_group_b)) =
                (average_of(&group_a), average_of(&group_b))
            else {
                // One group has no values for this metric; nothing to compare.
                continue;
            };

            let absolute_difference = (average_group_a - average_group_b).abs();
            let relative_difference = if average_group_b == 0.0 {
                None
            } else {
                Some(absolute_difference / average_group_b)
            };

            key_differences.push(KeyDifference {
                metric_column: metric.name.clone(),
                average_group_a,
                average_group_b,
                absolute_difference,
                relative_difference,
                rank: 0,
            });
        }

        rank_key_differences(&mut key_differences);

        Ok(Some(OutcomeAnalysis {
            outcome_column: outcome.name.clone(),
            overall_rate,
            rates_by_category,
            key_differences,
        }))
    }
}

impl Default for BaselineEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the outcome column: the first boolean column whose name contains a
/// hint, else the first boolean column.
pub(crate) fn designate_outcome_column<'a>(
    profile: &'a DatasetProfile,
    hints: &[String],
) -> Option<&'a ColumnProfile> {
    profile
        .boolean_columns()
        .find(|c| {
            let name = c.name.to_ascii_lowercase();
            hints.iter().any(|hint| name.contains(hint.as_str()))
        })
        .or_else(|| profile.boolean_columns().next())
}

/// Sort by descending absolute relative difference, undefined ratios last,
/// then assign 1-based ranks.
fn rank_key_differences(key_differences: &mut [KeyDifference]) {
    key_differences.sort_by(|a, b| match (a.relative_difference, b.relative_difference) {
        (Some(x), Some(y)) => y
            .abs()
            .partial_cmp(&x.abs())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.metric_column.cmp(&b.metric_column)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.metric_column.cmp(&b.metric_column),
    });
    for (i, difference) in key_differences.iter_mut().enumerate() {
        difference.rank = i + 1;
    }
}

fn outcome_rates_by_category(
    table: &DataTable,
    category_idx: usize,
    outcome_idx: usize,
) -> Vec<CategoryOutcomeRate> {
    let mut accumulator: IndexMap<String, (usize, usize)> = IndexMap::new();

    for row in &table.rows {
        let Some(raw) = row.get(category_idx) else {
            continue;
        };
        if DataTable::is_null_value(raw) {
            continue;
        }
        let Some(outcome) = row.get(outcome_idx).and_then(|v| values::parse_bool(v)) else {
            continue;
        };
        let entry = accumulator.entry(raw.trim().to_string()).or_insert((0, 0));
        entry.0 += 1;
        if outcome {
            entry.1 += 1;
        }
    }

    let mut rates: Vec<CategoryOutcomeRate> = accumulator
        .into_iter()
        .map(|(category, (count, positives))| CategoryOutcomeRate {
            category,
            count,
            rate: positives as f64 / count as f64,
        })
        .collect();

    rates.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
    });
    rates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::profile::Profiler;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn run_baseline(content: &str) -> BaselineAnalysis {
        let file = write_csv(content);
        let parser = Parser::new();
        let (table, source) = parser.parse_file(file.path()).unwrap();
        let profile = Profiler::new()
            .profile(&table, source.dataset_version_id)
            .unwrap();
        BaselineEngine::new().run(&profile, file.path()).unwrap()
    }

    const CHURN_CSV: &str = "\
revenue,sessions,plan,churned
100,14,basic,true
200,10,pro,false
300,11,pro,false
50,2,basic,true
250,12,pro,false
80,3,basic,true
";

    #[test]
    fn test_phase_a_summaries() {
        let analysis = run_baseline(CHURN_CSV);
        let summaries = &analysis.phase_a.metric_summaries;
        assert_eq!(summaries.len(), 2);

        let revenue = &summaries[0];
        assert_eq!(revenue.column_name, "revenue");
        assert_eq!(revenue.row_count, 6);
        assert_eq!(revenue.non_null_count, 6);
        assert_eq!(revenue.min, 50.0);
        assert_eq!(revenue.max, 300.0);
        assert_eq!(revenue.distribution.len(), 10);
        assert_eq!(
            revenue.distribution.iter().map(|b| b.count).sum::<usize>(),
            6
        );
    }

    #[test]
    fn test_phase_b_pairs_metrics_with_categoricals() {
        let analysis = run_baseline(CHURN_CSV);
        // One categorical (plan) times two metrics.
        assert_eq!(analysis.phase_b.breakdowns.len(), 2);
        let breakdown = &analysis.phase_b.breakdowns[0];
        assert_eq!(breakdown.categorical_column, "plan");
        assert_eq!(breakdown.breakdowns[0].category, "basic");
        assert_eq!(breakdown.breakdowns[0].count, 3);
    }

    #[test]
    fn test_phase_c_overall_rate_and_ranking() {
        let analysis = run_baseline(CHURN_CSV);
        let outcome = analysis.phase_c.expect("churned column should be designated");

        assert_eq!(outcome.outcome_column, "churned");
        assert!((outcome.overall_rate - 0.5).abs() < 1e-9);

        let differences = &outcome.key_differences;
        assert_eq!(differences.len(), 2);
        assert_eq!(differences[0].rank, 1);
        assert_eq!(differences[1].rank, 2);
        assert!(
            differences[0].relative_difference.unwrap().abs()
                >= differences[1].relative_difference.unwrap().abs()
        );
    }

    #[test]
    fn test_phase_c_absent_without_boolean_column() {
        let analysis = run_baseline("a,b\n1,x\n2,y\n");
        assert!(analysis.phase_c.is_none());
    }

    #[test]
    fn test_zero_denominator_relative_difference_is_none() {
        let csv = "\
delta,flag
5,true
-5,false
5,true
5,false
";
        let analysis = run_baseline(csv);
        let outcome = analysis.phase_c.unwrap();
        let diff = &outcome.key_differences[0];
        // group_b averages to zero: (-5 + 5) / 2
        assert_eq!(diff.average_group_b, 0.0);
        assert!(diff.relative_difference.is_none());
        assert_eq!(diff.rank, 1);
    }

    #[test]
    fn test_baseline_phases_are_idempotent() {
        let file = write_csv(CHURN_CSV);
        let parser = Parser::new();
        let (table, source) = parser.parse_file(file.path()).unwrap();
        let profile = Profiler::new()
            .profile(&table, source.dataset_version_id)
            .unwrap();

        let engine = BaselineEngine::new();
        let first = engine.run(&profile, file.path()).unwrap();
        let second = engine.run(&profile, file.path()).unwrap();

        assert_eq!(first.phase_a, second.phase_a);
        assert_eq!(first.phase_b, second.phase_b);
        assert_eq!(first.phase_c, second.phase_c);
        assert_eq!(
            first.metadata.dataset_version_id,
            second.metadata.dataset_version_id
        );
    }

    #[test]
    fn test_outcome_designation_prefers_hinted_name() {
        let csv = "\
flag,churned,v
true,false,1
false,true,2
";
        let file = write_csv(csv);
        let parser = Parser::new();
        let (table, source) = parser.parse_file(file.path()).unwrap();
        let profile = Profiler::new()
            .profile(&table, source.dataset_version_id)
            .unwrap();
        let outcome =
            designate_outcome_column(&profile, &BaselineConfig::default().outcome_hints).unwrap();
        assert_eq!(outcome.name, "churned");
    }
}
