//! Execution: turning approved resolutions into artifacts, plus the
//! question-independent baseline report and drill-down comparisons.

mod artifact;
mod baseline;
mod drilldown;
mod executor;
mod stats;

pub use artifact::{
    Artifact, ArtifactData, BreakdownResult, CategoryBreakdown, ScalarResult, TimeGranularity,
    TimeSeriesPoint, TimeSeriesResult,
};
pub use baseline::{
    BaselineAnalysis, BaselineConfig, BaselineEngine, BaselineMetadata, BreakdownPhase,
    CategoryOutcomeRate, KeyDifference, MetricSummary, MetricSummaryPhase, OutcomeAnalysis,
    OutcomeRateBreakdown, StandardBreakdown,
};
pub use drilldown::{
    DrillDownComparison, DrillDownConfig, DrillDownError, DrillDownErrorCode, DrillDownService,
    GroupDistribution,
};
pub use executor::{ExecutionEngine, ExecutionError, ExecutionErrorCode};
pub use stats::{HistogramBucket, Percentiles};
