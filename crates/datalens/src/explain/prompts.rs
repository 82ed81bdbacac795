//! Prompt templates for LLM-backed explanation providers.

use crate::engine::Artifact;
use crate::guard::GuardBlock;

/// System prompt shared by all explanation requests.
pub fn system_prompt() -> &'static str {
    "You are a data analyst assistant. You receive the JSON result of a \
     deterministic computation over a tabular dataset and phrase it as a short, \
     plain-language answer. You must never change, re-derive, or second-guess \
     the numbers or verdicts you are given; only describe them. Two to four \
     sentences, no markdown."
}

/// Prompt for phrasing a computed artifact.
pub fn artifact_prompt(question: &str, artifact: &Artifact) -> String {
    let payload = serde_json::to_string_pretty(artifact)
        .unwrap_or_else(|_| "(unserializable artifact)".to_string());
    format!(
        "The user asked: \"{question}\"\n\n\
         The computed result is:\n{payload}\n\n\
         Explain this result in plain language."
    )
}

/// Prompt for phrasing a guard block.
pub fn block_prompt(question: &str, block: &GuardBlock) -> String {
    let payload = serde_json::to_string_pretty(block)
        .unwrap_or_else(|_| "(unserializable block)".to_string());
    format!(
        "The user asked: \"{question}\"\n\n\
         The request was refused by a validation rule:\n{payload}\n\n\
         Explain why the operation is not meaningful for this column and \
         suggest what to ask instead, using the listed alternatives. The \
         refusal itself is final."
    )
}
