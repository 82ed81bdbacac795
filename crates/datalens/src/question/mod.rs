//! Question understanding: intent classification and metric/dimension
//! resolution. Both stages are deterministic; the classifier never touches
//! the dataset and the resolver never guesses silently.

mod classifier;
mod intent;
mod resolver;

pub use classifier::{ClassifierConfig, IntentClassifier};
pub use intent::{Intent, IntentClassification};
pub use resolver::{
    MetricResolution, ResolutionError, ResolutionErrorCode, ResolvedColumn, Resolver,
};
