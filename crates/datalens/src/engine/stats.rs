//! Shared numeric helpers: histograms and interpolated percentiles.

use serde::{Deserialize, Serialize};

/// One bucket of an equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Range label, e.g. `"10.00-20.00"`.
    pub label: String,
    pub count: usize,
    /// Share of values in this bucket, 0-100.
    pub percentage: f64,
}

/// Quartile statistics computed by linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

/// Equal-width histogram over the values' own min..max range.
pub fn histogram(values: &[f64], bucket_count: usize) -> Vec<HistogramBucket> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    histogram_with_range(values, min, max, bucket_count)
}

/// Equal-width histogram over an explicit range, so two value sets can share
/// bucket edges and stay visually comparable.
pub fn histogram_with_range(
    values: &[f64],
    min: f64,
    max: f64,
    bucket_count: usize,
) -> Vec<HistogramBucket> {
    if values.is_empty() || bucket_count == 0 {
        return Vec::new();
    }

    // Degenerate range: every value lands in one bucket.
    if max <= min {
        return vec![HistogramBucket {
            label: format!("{:.2}-{:.2}", min, max),
            count: values.len(),
            percentage: 100.0,
        }];
    }

    let width = (max - min) / bucket_count as f64;
    let mut counts = vec![0usize; bucket_count];

    for &value in values {
        let idx = (((value - min) / width) as usize).min(bucket_count - 1);
        counts[idx] += 1;
    }

    let total = values.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lo = min + width * i as f64;
            let hi = min + width * (i + 1) as f64;
            HistogramBucket {
                label: format!("{:.2}-{:.2}", lo, hi),
                count,
                percentage: count as f64 / total * 100.0,
            }
        })
        .collect()
}

/// Percentile of an ascending-sorted slice via linear interpolation.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (p / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let fraction = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * fraction
        }
    }
}

/// p25/p50/p75 of an ascending-sorted slice.
pub fn percentiles(sorted: &[f64]) -> Percentiles {
    Percentiles {
        p25: percentile(sorted, 25.0),
        p50: percentile(sorted, 50.0),
        p75: percentile(sorted, 75.0),
    }
}

/// Mean of a slice; `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_and_percentages() {
        let values = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0];
        let buckets = histogram(&values, 10);
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 10);
        let total_pct: f64 = buckets.iter().map(|b| b.percentage).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);
        // The maximum lands in the last bucket, not past it.
        assert_eq!(buckets[9].count, 1);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let values = vec![5.0, 5.0, 5.0];
        let buckets = histogram(&values, 10);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 3);
        assert_eq!(buckets[0].percentage, 100.0);
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = vec![1.0, 2.0, 3.0, 4.0];
        // rank = 0.25 * 3 = 0.75 -> 1 + 0.75 * (2 - 1)
        assert!((percentile(&sorted, 25.0) - 1.75).abs() < 1e-9);
        assert!((percentile(&sorted, 50.0) - 2.5).abs() < 1e-9);
        assert!((percentile(&sorted, 75.0) - 3.25).abs() < 1e-9);
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 100.0), 4.0);
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[42.0], 50.0), 42.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }
}
