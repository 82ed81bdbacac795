//! Metric/dimension resolution: mapping question text to concrete columns.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::{ColumnProfile, DatasetProfile};

use super::intent::Intent;

/// Words that carry no column information: grammar plus the intent keywords
/// already consumed by the classifier. Keeping these out of matching stops a
/// column called `age` from latching onto the word "average".
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "average", "avg", "break", "breakdown", "by", "compare",
    "comparison", "count", "dataset", "difference", "down", "each", "for", "from", "grouped",
    "how", "in", "is", "many", "me", "mean", "much", "number", "of", "on", "or", "over", "per",
    "show", "sum", "the", "their", "time", "to", "total", "trend", "versus", "vs", "was", "what",
    "whats", "which", "with",
];

/// Phrase following a grouping cue, e.g. "by region" or "per sales channel".
static DIMENSION_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:grouped by|for each|by|per|across|between|versus|vs\.?)\s+([a-z0-9_]+(?:[\s_][a-z0-9_]+)?)",
    )
    .unwrap()
});

/// Why resolution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionErrorCode {
    NoMetricMatch,
    NoDimensionMatch,
    NoTimeColumnMatch,
}

/// Structured resolution failure; a resolution is never both a value and an
/// error.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ResolutionError {
    pub code: ResolutionErrorCode,
    pub message: String,
}

/// A column selected by the resolver, carrying its profile so downstream
/// stages consume the inferred type tag instead of re-inferring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub column_name: String,
    pub profile: ColumnProfile,
}

impl ResolvedColumn {
    fn from_profile(profile: &ColumnProfile) -> Self {
        Self {
            column_name: profile.name.clone(),
            profile: profile.clone(),
        }
    }
}

/// The mapping from question text to concrete dataset columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResolution {
    pub metric: ResolvedColumn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<ResolvedColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_column: Option<ResolvedColumn>,
}

/// Matches question noun phrases against profiled column names.
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the metric column, plus a dimension for grouping intents and a
    /// time column for time-series intents.
    pub fn resolve_all(
        &self,
        question: &str,
        profile: &DatasetProfile,
        intent: Intent,
    ) -> Result<MetricResolution, ResolutionError> {
        let dimension_phrase = DIMENSION_CUE
            .captures(question)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        // Resolve the dimension from its cue phrase first so that its words
        // do not compete for the metric slot.
        let mut dimension = None;
        if intent.needs_dimension() {
            if let Some(ref phrase) = dimension_phrase {
                let candidates = candidate_phrases(phrase);
                dimension = best_match(&candidates, profile.columns.iter());
            }
        }

        let mut metric_text = question.to_string();
        if let Some(ref phrase) = dimension_phrase {
            if dimension.is_some() {
                metric_text = metric_text.replace(phrase.as_str(), " ");
            }
        }

        let metric_candidates = candidate_phrases(&metric_text);
        let metric = best_match(
            &metric_candidates,
            profile
                .columns
                .iter()
                .filter(|c| Some(c.name.as_str()) != dimension.map(|d| d.name.as_str())),
        )
        .ok_or_else(|| ResolutionError {
            code: ResolutionErrorCode::NoMetricMatch,
            message: format!(
                "No column matches the question. Available columns: {}.",
                profile.column_names().join(", ")
            ),
        })?;

        if intent.needs_dimension() && dimension.is_none() {
            // No usable cue phrase; fall back to the best categorical match
            // in the remaining text.
            dimension = best_match(
                &metric_candidates,
                profile
                    .columns
                    .iter()
                    .filter(|c| c.name != metric.name && c.semantic_type.is_categorical()),
            );
            if dimension.is_none() {
                return Err(ResolutionError {
                    code: ResolutionErrorCode::NoDimensionMatch,
                    message: format!(
                        "No categorical column to group by. Available columns: {}.",
                        profile.column_names().join(", ")
                    ),
                });
            }
        }

        let time_column = if intent.needs_time_column() {
            Some(self.resolve_time_column(&metric_candidates, profile, &metric.name)?)
        } else {
            None
        };

        Ok(MetricResolution {
            metric: ResolvedColumn::from_profile(metric),
            dimension: dimension.map(ResolvedColumn::from_profile),
            time_column,
        })
    }

    fn resolve_time_column(
        &self,
        candidates: &[String],
        profile: &DatasetProfile,
        metric_name: &str,
    ) -> Result<ResolvedColumn, ResolutionError> {
        let date_columns: Vec<&ColumnProfile> = profile
            .date_columns()
            .filter(|c| c.name != metric_name)
            .collect();

        if date_columns.is_empty() {
            return Err(ResolutionError {
                code: ResolutionErrorCode::NoTimeColumnMatch,
                message: "The dataset has no date column to build a time series over.".to_string(),
            });
        }

        if let Some(matched) = best_match(candidates, date_columns.iter().copied()) {
            return Ok(ResolvedColumn::from_profile(matched));
        }

        // A single date column is determined, not guessed.
        if date_columns.len() == 1 {
            return Ok(ResolvedColumn::from_profile(date_columns[0]));
        }

        Err(ResolutionError {
            code: ResolutionErrorCode::NoTimeColumnMatch,
            message: format!(
                "Multiple date columns found ({}); name one in the question.",
                date_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

/// How well a phrase matched a column name. Exact normalized matches outrank
/// any substring overlap; overlaps rank by length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MatchScore {
    exact: bool,
    overlap: usize,
}

/// Pick the best-scoring column for a set of candidate phrases. Ties keep the
/// earliest column in header order.
fn best_match<'a>(
    candidates: &[String],
    columns: impl Iterator<Item = &'a ColumnProfile>,
) -> Option<&'a ColumnProfile> {
    let mut best: Option<(MatchScore, &ColumnProfile)> = None;

    for column in columns {
        let Some(score) = score_column(&column.name, candidates) else {
            continue;
        };
        match best {
            Some((existing, _)) if existing >= score => {}
            _ => best = Some((score, column)),
        }
    }

    best.map(|(_, column)| column)
}

fn score_column(column_name: &str, candidates: &[String]) -> Option<MatchScore> {
    let normalized = normalize(column_name);
    if normalized.is_empty() {
        return None;
    }

    let mut best: Option<MatchScore> = None;
    for phrase in candidates {
        let score = if *phrase == normalized {
            MatchScore {
                exact: true,
                overlap: normalized.len(),
            }
        } else {
            let overlap = longest_common_substring(phrase, &normalized);
            // Short overlaps match everything; require at least three
            // characters covering half the column name.
            if overlap < 3 || overlap * 2 < normalized.len() {
                continue;
            }
            MatchScore {
                exact: false,
                overlap,
            }
        };
        if best.map_or(true, |b| score > b) {
            best = Some(score);
        }
    }
    best
}

/// Candidate phrases for matching: normalized informative tokens plus joined
/// adjacent pairs, so "signup date" can meet a `signup_date` column.
fn candidate_phrases(text: &str) -> Vec<String> {
    let tokens: Vec<String> = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .map(|t| t.to_ascii_lowercase())
        .filter(|t| !t.is_empty() && !STOP_WORDS.contains(&t.as_str()))
        .collect();

    let mut phrases = Vec::with_capacity(tokens.len() * 2);
    for pair in tokens.windows(2) {
        phrases.push(format!("{}{}", pair[0], pair[1]));
    }
    phrases.extend(tokens);
    phrases
}

/// Case-insensitive, underscore/space/hyphen-insensitive form.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Length of the longest common substring of two short strings.
fn longest_common_substring(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous = vec![0usize; b.len() + 1];
    let mut longest = 0;

    for &ca in &a {
        let mut current = vec![0usize; b.len() + 1];
        for (j, &cb) in b.iter().enumerate() {
            if ca == cb {
                current[j + 1] = previous[j] + 1;
                longest = longest.max(current[j + 1]);
            }
        }
        previous = current;
    }
    longest
}
