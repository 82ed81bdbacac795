//! Mock explanation provider for tests and offline CLI runs.

use crate::engine::{Artifact, ArtifactData};
use crate::error::Result;
use crate::guard::GuardBlock;

use super::provider::{ExplainConfig, ExplanationProvider};

/// Deterministic, template-based explanations.
pub struct MockExplainer {
    config: ExplainConfig,
}

impl MockExplainer {
    pub fn new() -> Self {
        Self {
            config: ExplainConfig::default(),
        }
    }

    pub fn with_config(config: ExplainConfig) -> Self {
        Self { config }
    }
}

impl Default for MockExplainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationProvider for MockExplainer {
    fn explain_artifact(&self, _question: &str, artifact: &Artifact) -> Result<String> {
        if !self.config.explain_artifacts {
            return Ok(String::new());
        }

        let explanation = match &artifact.data {
            ArtifactData::Scalar(scalar) => format!(
                "The {} of '{}' is {:.2}, computed over {} rows.",
                scalar.operation.describe(),
                scalar.column,
                scalar.value,
                scalar.rows_considered
            ),
            ArtifactData::Breakdown(breakdown) => format!(
                "'{}' broken down by '{}' yields {} categories; the largest is '{}' with {} rows.",
                breakdown.metric,
                breakdown.dimension,
                breakdown.groups.len(),
                breakdown.groups.first().map(|g| g.category.as_str()).unwrap_or("-"),
                breakdown.groups.first().map(|g| g.count).unwrap_or(0)
            ),
            ArtifactData::TimeSeries(series) => format!(
                "'{}' over '{}' spans {} {} buckets.",
                series.metric,
                series.time_column,
                series.points.len(),
                series.granularity.label()
            ),
            ArtifactData::Distribution(comparison) => format!(
                "'{}' compared between {} ({} rows) and {} ({} rows).",
                comparison.metric_column,
                comparison.group_a.label,
                comparison.group_a.sample_size,
                comparison.group_b.label,
                comparison.group_b.sample_size
            ),
            ArtifactData::OutcomeAnalysis(outcome) => format!(
                "Overall '{}' rate is {:.1}%, with {} ranked metric differences.",
                outcome.outcome_column,
                outcome.overall_rate * 100.0,
                outcome.key_differences.len()
            ),
        };

        Ok(explanation)
    }

    fn explain_block(&self, _question: &str, block: &GuardBlock) -> Result<String> {
        if !self.config.explain_blocks {
            return Ok(String::new());
        }

        let alternatives: Vec<&str> = block
            .suggested_alternatives
            .iter()
            .map(|op| op.describe())
            .collect();

        Ok(format!(
            "The question asks to {} '{}', but that column holds {} values, so the result \
             would not mean anything. {} Try asking for: {}.",
            block.attempted_operation.describe(),
            block.column,
            block.semantic_type.label(),
            block.reason,
            alternatives.join(", ")
        ))
    }

    fn config(&self) -> &ExplainConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}
