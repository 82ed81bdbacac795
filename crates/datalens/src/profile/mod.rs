//! Column profiling: semantic type inference and per-column statistics.

mod column;
mod dataset;
mod profiler;
mod types;
pub mod values;

pub use column::{ColumnProfile, NumericSummary};
pub use dataset::DatasetProfile;
pub use profiler::Profiler;
pub use types::SemanticType;
