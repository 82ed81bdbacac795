//! Explanation provider trait and configuration.

use crate::engine::Artifact;
use crate::error::Result;
use crate::guard::GuardBlock;

/// Configuration for explanation providers.
#[derive(Debug, Clone)]
pub struct ExplainConfig {
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,
    /// Maximum tokens in a response.
    pub max_tokens: usize,
    /// Sampling temperature (0.0-1.0).
    pub temperature: f64,
    /// Whether to explain successful artifacts.
    pub explain_artifacts: bool,
    /// Whether to explain guard blocks.
    pub explain_blocks: bool,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 512,
            temperature: 0.3,
            explain_artifacts: true,
            explain_blocks: true,
        }
    }
}

/// Trait for explanation providers.
///
/// Implementations must be thread-safe (Send + Sync) so one provider can
/// serve concurrent questions. Providers receive shared references only: the
/// artifact and the block are immutable to them by construction.
pub trait ExplanationProvider: Send + Sync {
    /// Phrase a computed artifact as prose answering the original question.
    fn explain_artifact(&self, question: &str, artifact: &Artifact) -> Result<String>;

    /// Phrase a guard block as prose: why the operation was refused and what
    /// to ask instead. The verdict itself is final.
    fn explain_block(&self, question: &str, block: &GuardBlock) -> Result<String>;

    /// Provider configuration.
    fn config(&self) -> &ExplainConfig;

    /// Provider name, for logging and CLI display.
    fn name(&self) -> &str;
}
