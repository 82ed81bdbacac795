//! Main Analyst struct: the profile → classify → resolve → guard → execute
//! pipeline, plus entry points for the baseline report and drill-downs.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::{
    Artifact, ArtifactData, BaselineAnalysis, BaselineConfig, BaselineEngine, DrillDownConfig,
    DrillDownService, ExecutionEngine, ExecutionError,
};
use crate::error::Result;
use crate::explain::ExplanationProvider;
use crate::guard::{GuardBlock, SemanticGuard};
use crate::input::{DatasetSource, Parser, ParserConfig};
use crate::profile::{DatasetProfile, Profiler};
use crate::question::{
    ClassifierConfig, Intent, IntentClassification, IntentClassifier, ResolutionError, Resolver,
};

/// Configuration for the full pipeline.
#[derive(Debug, Clone, Default)]
pub struct AnalystConfig {
    pub parser: ParserConfig,
    pub classifier: ClassifierConfig,
    pub baseline: BaselineConfig,
    pub drilldown: DrillDownConfig,
}

/// The outcome of asking one question. Exactly one variant per stage that can
/// stop the pipeline, so callers always know which stage decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuestionOutcome {
    /// The pipeline ran to completion.
    Answered {
        classification: IntentClassification,
        artifact: Artifact,
    },
    /// The semantic guard refused the operation; its verdict is final.
    Blocked {
        classification: IntentClassification,
        block: GuardBlock,
        #[serde(skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
    },
    /// No dataset column matched the question.
    Unresolved {
        classification: IntentClassification,
        error: ResolutionError,
    },
    /// The question asked for nothing this pipeline supports.
    Unsupported {
        classification: IntentClassification,
        message: String,
    },
    /// Execution failed after the guard approved (file or consistency
    /// problems).
    Failed {
        classification: IntentClassification,
        error: ExecutionError,
    },
}

/// The deterministic analytics pipeline over a single flat dataset.
pub struct Analyst {
    parser: Parser,
    profiler: Profiler,
    classifier: IntentClassifier,
    resolver: Resolver,
    guard: SemanticGuard,
    engine: ExecutionEngine,
    baseline: BaselineEngine,
    drilldown: DrillDownService,
    explainer: Option<Arc<dyn ExplanationProvider>>,
}

impl Analyst {
    /// Create an analyst with default configuration.
    pub fn new() -> Self {
        Self::with_config(AnalystConfig::default())
    }

    /// Create an analyst with custom configuration.
    pub fn with_config(config: AnalystConfig) -> Self {
        Self {
            parser: Parser::with_config(config.parser.clone()),
            profiler: Profiler::new(),
            classifier: IntentClassifier::with_config(config.classifier.clone()),
            resolver: Resolver::new(),
            guard: SemanticGuard::new(),
            engine: ExecutionEngine::with_parser(Parser::with_config(config.parser.clone())),
            baseline: BaselineEngine::with_config(config.baseline.clone()),
            drilldown: DrillDownService::with_config(config.drilldown.clone()),
            explainer: None,
        }
    }

    /// Attach an explanation provider.
    ///
    /// The provider phrases artifacts and guard blocks as prose. It is
    /// best-effort: its failures never fail the pipeline, and it cannot
    /// alter a verdict or a computed value.
    pub fn with_explainer(mut self, provider: impl ExplanationProvider + 'static) -> Self {
        self.explainer = Some(Arc::new(provider));
        self
    }

    /// Load and profile a dataset file.
    pub fn profile(&self, path: impl AsRef<Path>) -> Result<(DatasetProfile, DatasetSource)> {
        let (table, source) = self.parser.parse_file(path)?;
        let profile = self
            .profiler
            .profile(&table, source.dataset_version_id.clone())?;
        Ok((profile, source))
    }

    /// Answer a natural-language question about a dataset file.
    ///
    /// Stage failures are data, not errors: every stage that can stop the
    /// pipeline has its own [`QuestionOutcome`] variant. The `Err` side of
    /// the result is reserved for the boundary (unreadable or empty files).
    pub fn ask(&self, path: impl AsRef<Path>, question: &str) -> Result<QuestionOutcome> {
        let path = path.as_ref();
        let (table, source) = self.parser.parse_file(path)?;
        let profile = self
            .profiler
            .profile(&table, source.dataset_version_id.clone())?;

        let classification = self.classifier.classify(question);
        if classification.intent == Intent::UnsupportedQuery {
            return Ok(QuestionOutcome::Unsupported {
                classification,
                message: "The question could not be mapped to a supported analysis. \
                          Rephrase it using averages, totals, counts, breakdowns (\"by ...\"), \
                          trends over time, or comparisons."
                    .to_string(),
            });
        }

        let resolution =
            match self
                .resolver
                .resolve_all(question, &profile, classification.intent)
            {
                Ok(resolution) => resolution,
                Err(error) => {
                    return Ok(QuestionOutcome::Unresolved {
                        classification,
                        error,
                    });
                }
            };

        if let Some(block) = self.guard.validate(
            &resolution,
            classification.intent,
            &profile.dataset_version_id,
        ) {
            let explanation = self.explain_block(question, &block);
            return Ok(QuestionOutcome::Blocked {
                classification,
                block,
                explanation,
            });
        }

        match self.engine.execute(path, classification.intent, &resolution) {
            Ok(artifact) => {
                let artifact = match self.explain_artifact(question, &artifact) {
                    Some(prose) => artifact.with_explanation(prose),
                    None => artifact,
                };
                Ok(QuestionOutcome::Answered {
                    classification,
                    artifact,
                })
            }
            Err(error) => Ok(QuestionOutcome::Failed {
                classification,
                error,
            }),
        }
    }

    /// Run the three-phase baseline report for a dataset file.
    pub fn baseline(&self, path: impl AsRef<Path>) -> Result<BaselineAnalysis> {
        let path = path.as_ref();
        let (profile, _) = self.profile(path)?;
        Ok(self.baseline.run(&profile, path)?)
    }

    /// Wrap a baseline's outcome analysis as a storable artifact.
    pub fn outcome_artifact(&self, analysis: &BaselineAnalysis) -> Option<Artifact> {
        analysis.phase_c.clone().map(|outcome| {
            Artifact::new(
                analysis.metadata.dataset_version_id.clone(),
                ArtifactData::OutcomeAnalysis(outcome),
            )
        })
    }

    /// Drill into a metric (typically one named by a key difference),
    /// comparing the two outcome groups.
    pub fn drill_down(
        &self,
        path: impl AsRef<Path>,
        metric_column: &str,
        secondary_dimension: Option<&str>,
    ) -> Result<Artifact> {
        let path = path.as_ref();
        let comparison = self
            .drilldown
            .drill_down(path, metric_column, secondary_dimension)?;
        // Independent read for provenance; the file is immutable per version.
        let (_, source) = self.parser.parse_file(path)?;
        Ok(Artifact::new(
            source.dataset_version_id,
            ArtifactData::Distribution(comparison),
        ))
    }

    fn explain_artifact(&self, question: &str, artifact: &Artifact) -> Option<String> {
        let explainer = self.explainer.as_ref()?;
        explainer
            .explain_artifact(question, artifact)
            .ok()
            .filter(|prose| !prose.is_empty())
    }

    fn explain_block(&self, question: &str, block: &GuardBlock) -> Option<String> {
        let explainer = self.explainer.as_ref()?;
        explainer
            .explain_block(question, block)
            .ok()
            .filter(|prose| !prose.is_empty())
    }
}

impl Default for Analyst {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::explain::MockExplainer;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const SALES_CSV: &str = "\
revenue,region,signup_date
100,east,2024-01-05
200,west,2024-02-10
300,east,2024-03-15
";

    #[test]
    fn test_ask_average_revenue() {
        let file = write_csv(SALES_CSV);
        let outcome = Analyst::new()
            .ask(file.path(), "What is the average of revenue?")
            .unwrap();

        match outcome {
            QuestionOutcome::Answered {
                classification,
                artifact,
            } => {
                assert_eq!(classification.intent, Intent::AggregateAvg);
                match artifact.data {
                    ArtifactData::Scalar(ref scalar) => assert_eq!(scalar.value, 200.0),
                    ref other => panic!("expected scalar, got {other:?}"),
                }
            }
            other => panic!("expected answered outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_ask_average_of_date_is_blocked() {
        let file = write_csv(SALES_CSV);
        let outcome = Analyst::new()
            .ask(file.path(), "What is the average of signup_date?")
            .unwrap();

        match outcome {
            QuestionOutcome::Blocked { block, .. } => {
                assert_eq!(block.column, "signup_date");
                assert!(!block.suggested_alternatives.is_empty());
            }
            other => panic!("expected blocked outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_ask_unsupported_question_has_actionable_message() {
        let file = write_csv(SALES_CSV);
        let outcome = Analyst::new()
            .ask(file.path(), "please write a poem")
            .unwrap();

        match outcome {
            QuestionOutcome::Unsupported { message, .. } => {
                assert!(message.contains("averages"));
            }
            other => panic!("expected unsupported outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_ask_unknown_column_is_unresolved() {
        let file = write_csv(SALES_CSV);
        let outcome = Analyst::new()
            .ask(file.path(), "average of flux capacitance")
            .unwrap();

        assert!(matches!(outcome, QuestionOutcome::Unresolved { .. }));
    }

    #[test]
    fn test_explainer_annotates_but_never_alters() {
        let file = write_csv(SALES_CSV);
        let analyst = Analyst::new().with_explainer(MockExplainer::new());
        let outcome = analyst
            .ask(file.path(), "What is the average of revenue?")
            .unwrap();

        match outcome {
            QuestionOutcome::Answered { artifact, .. } => {
                assert!(artifact.explanation.is_some());
                match artifact.data {
                    ArtifactData::Scalar(ref scalar) => assert_eq!(scalar.value, 200.0),
                    ref other => panic!("expected scalar, got {other:?}"),
                }
            }
            other => panic!("expected answered outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_blocked_outcome_with_explainer() {
        let file = write_csv(SALES_CSV);
        let analyst = Analyst::new().with_explainer(MockExplainer::new());
        let outcome = analyst
            .ask(file.path(), "What is the average of signup_date?")
            .unwrap();

        match outcome {
            QuestionOutcome::Blocked {
                explanation, block, ..
            } => {
                let prose = explanation.unwrap();
                assert!(prose.contains("signup_date"));
                // The block itself is untouched by the explainer.
                assert_eq!(block.column, "signup_date");
            }
            other => panic!("expected blocked outcome, got {other:?}"),
        }
    }
}
