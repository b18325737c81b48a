//! Mann-Whitney U rank-sum test
//!
//! Nonparametric two-sample test used for between-timepoint comparisons;
//! telomere-length distributions are skewed enough that a t-test is not
//! defensible. Normal approximation with tie correction and continuity
//! correction, two-sided.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Result, TeloError};

/// Result of a Mann-Whitney U test
#[derive(Debug, Clone, Copy)]
pub struct MannWhitney {
    /// The smaller of the two U statistics
    pub u: f64,
    /// Two-sided p-value from the normal approximation
    pub p_value: f64,
}

/// Average ranks of the pooled values (1-based), ties sharing their mean
/// rank. Returns the rank sum of the first `n1` pool entries and the tie
/// term `sum(t^3 - t)` over tie groups.
fn rank_sum_first(pooled: &mut [(f64, bool)]) -> (f64, f64) {
    pooled.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut rank_sum = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < pooled.len() {
        let mut j = i + 1;
        while j < pooled.len() && pooled[j].0 == pooled[i].0 {
            j += 1;
        }
        let t = (j - i) as f64;
        // mean of ranks i+1 ..= j
        let avg_rank = (i + j + 1) as f64 / 2.0;
        for entry in &pooled[i..j] {
            if entry.1 {
                rank_sum += avg_rank;
            }
        }
        tie_term += t * t * t - t;
        i = j;
    }
    (rank_sum, tie_term)
}

/// Two-sided Mann-Whitney U test of `x` against `y`.
///
/// Errors on an empty side or when every pooled value is identical (the
/// statistic is degenerate there).
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<MannWhitney> {
    if x.is_empty() || y.is_empty() {
        return Err(TeloError::InvalidInput {
            reason: "Mann-Whitney requires non-empty samples on both sides".to_string(),
        });
    }

    let n1 = x.len() as f64;
    let n2 = y.len() as f64;
    let n = n1 + n2;

    let mut pooled: Vec<(f64, bool)> = x
        .iter()
        .map(|&v| (v, true))
        .chain(y.iter().map(|&v| (v, false)))
        .collect();
    let (r1, tie_term) = rank_sum_first(&mut pooled);

    let u1 = n1 * n2 + n1 * (n1 + 1.0) / 2.0 - r1;
    let u2 = n1 * n2 - u1;
    let u = u1.min(u2);

    let mean_u = n1 * n2 / 2.0;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if variance <= 0.0 {
        return Err(TeloError::InvalidInput {
            reason: "Mann-Whitney is degenerate: all pooled values are identical".to_string(),
        });
    }
    let sigma = variance.sqrt();

    let z = (u - mean_u + 0.5) / sigma;
    let normal = Normal::new(0.0, 1.0).unwrap();
    let p_value = (2.0 * normal.cdf(z)).clamp(0.0, 1.0);

    Ok(MannWhitney { u, p_value })
}
