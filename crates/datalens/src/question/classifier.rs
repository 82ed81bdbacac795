//! Deterministic keyword/pattern intent classification.

use once_cell::sync::Lazy;
use regex::Regex;

use super::intent::{Intent, IntentClassification};

/// Rules are checked in order; the first match wins. Time-series and compare
/// phrasing is more specific than a bare "by <word>", so those run first.
static RULES: Lazy<Vec<(Regex, Intent, f64)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(
                r"(?i)\b(over time|trend|trending|timeline|time series|(?:per|by|each) (?:day|week|month|quarter|year)|daily|weekly|monthly|quarterly|yearly)\b",
            )
            .unwrap(),
            Intent::TimeSeries,
            0.9,
        ),
        (
            Regex::new(r"(?i)\b(compare|comparison|versus|vs\.?|difference between)\b").unwrap(),
            Intent::Compare,
            0.85,
        ),
        (
            Regex::new(r"(?i)\b(?:by|per|across)\s+[a-z0-9_]+|\bfor each\b|\bgrouped by\b|\bbreak(?:\s?down)\b")
                .unwrap(),
            Intent::GroupBy,
            0.8,
        ),
        (
            Regex::new(r"(?i)\b(average|mean|avg)\b").unwrap(),
            Intent::AggregateAvg,
            0.9,
        ),
        (
            Regex::new(r"(?i)\b(total|sum)\b").unwrap(),
            Intent::AggregateSum,
            0.9,
        ),
        (
            Regex::new(r"(?i)\bhow many\b|\bcount\b|\bnumber of\b").unwrap(),
            Intent::AggregateCount,
            0.9,
        ),
    ]
});

static QUOTED_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).unwrap());

/// Classifier configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Matches scoring below this confidence fall back to `unsupported_query`.
    pub min_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
        }
    }
}

/// Maps a natural-language question to an [`Intent`] with a confidence score.
///
/// Operates purely on text; the dataset is never consulted.
pub struct IntentClassifier {
    config: ClassifierConfig,
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Classify a question.
    pub fn classify(&self, question: &str) -> IntentClassification {
        let extracted_value = QUOTED_LITERAL
            .captures(question)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        for (pattern, intent, confidence) in RULES.iter() {
            if pattern.is_match(question) {
                if *confidence < self.config.min_confidence {
                    break;
                }
                return IntentClassification {
                    intent: *intent,
                    confidence: *confidence,
                    extracted_value,
                };
            }
        }

        IntentClassification {
            intent: Intent::UnsupportedQuery,
            confidence: 0.0,
            extracted_value,
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(question: &str) -> IntentClassification {
        IntentClassifier::new().classify(question)
    }

    #[test]
    fn test_classify_average() {
        let result = classify("What is the average of revenue?");
        assert_eq!(result.intent, Intent::AggregateAvg);
        assert!(result.confidence >= 0.5);
    }

    #[test]
    fn test_classify_sum_and_count() {
        assert_eq!(classify("total sales").intent, Intent::AggregateSum);
        assert_eq!(classify("how many orders failed?").intent, Intent::AggregateCount);
        assert_eq!(classify("count of users").intent, Intent::AggregateCount);
    }

    #[test]
    fn test_classify_group_by_beats_aggregate() {
        let result = classify("average revenue by region");
        assert_eq!(result.intent, Intent::GroupBy);
    }

    #[test]
    fn test_classify_time_series_beats_group_by() {
        assert_eq!(classify("revenue trend over time").intent, Intent::TimeSeries);
        assert_eq!(classify("sales by month").intent, Intent::TimeSeries);
    }

    #[test]
    fn test_classify_compare() {
        assert_eq!(classify("compare churned vs retained users").intent, Intent::Compare);
    }

    #[test]
    fn test_unsupported_question() {
        let result = classify("tell me a story about dragons");
        assert_eq!(result.intent, Intent::UnsupportedQuery);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_extracted_quoted_value() {
        let result = classify("how many rows have status 'active'?");
        assert_eq!(result.extracted_value.as_deref(), Some("active"));
    }

    #[test]
    fn test_classification_ignores_dataset() {
        // Same text, same result, regardless of when or how often it runs.
        let a = classify("sum of profit by team");
        let b = classify("sum of profit by team");
        assert_eq!(a, b);
    }
}
