//! Datalens: a deterministic analytics core for question-driven analysis of
//! flat tabular datasets.
//!
//! Datalens turns a natural-language question about a CSV/TSV dataset into a
//! validated, executed aggregation with a typed, explainable result. Every
//! stage is rule-based and deterministic; anything semantically meaningless
//! (like averaging a date column) is blocked with an explanation instead of
//! silently producing a number.
//!
//! # Pipeline
//!
//! profile → classify → resolve → guard → execute
//!
//! - **Profiler** infers one semantic type per column, once per dataset
//!   version.
//! - **Classifier** maps the question text to a closed set of intents.
//! - **Resolver** matches question phrases to concrete columns.
//! - **Guard** checks the operation against the column's semantic type and
//!   is the only stage allowed to approve execution.
//! - **Execution** re-reads the authoritative file and produces an immutable
//!   [`Artifact`].
//!
//! # Example
//!
//! ```no_run
//! use datalens::{Analyst, QuestionOutcome};
//!
//! let analyst = Analyst::new();
//! match analyst.ask("sales.csv", "What is the average of revenue?").unwrap() {
//!     QuestionOutcome::Answered { artifact, .. } => println!("{:?}", artifact.data),
//!     QuestionOutcome::Blocked { block, .. } => println!("refused: {}", block.reason),
//!     other => println!("{other:?}"),
//! }
//! ```

pub mod engine;
pub mod error;
pub mod explain;
pub mod guard;
pub mod input;
pub mod profile;
pub mod question;

mod analyst;

pub use crate::analyst::{Analyst, AnalystConfig, QuestionOutcome};
pub use engine::{
    Artifact, ArtifactData, BaselineAnalysis, BaselineConfig, BaselineEngine, DrillDownComparison,
    DrillDownError, DrillDownService, ExecutionEngine, ExecutionError, KeyDifference,
};
pub use error::{DatalensError, Result};
pub use explain::{AnthropicExplainer, ExplanationProvider, MockExplainer};
pub use guard::{GuardBlock, Operation, SemanticGuard};
pub use input::{DataTable, DatasetSource, Parser, ParserConfig};
pub use profile::{ColumnProfile, DatasetProfile, NumericSummary, Profiler, SemanticType};
pub use question::{
    Intent, IntentClassification, IntentClassifier, MetricResolution, ResolutionError, Resolver,
};
