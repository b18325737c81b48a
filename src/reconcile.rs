//! Sample-size reconciliation
//!
//! Timepoints under statistical comparison need equal sample sizes. The
//! target is a cell-count times measurements-per-cell product (canonically
//! 30 x 184 = 5520). Oversized samples are randomly subsampled down to the
//! target; undersized ones are padded by redrawing from themselves, with
//! replacement when the deficit is more than half the target and without
//! when a lighter correction suffices. Samples of 25 measurements or fewer
//! are statistically inadequate for padding and pass through untouched.

use ndarray::{Array1, ArrayView1};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::data::CleanedSample;

/// Seed used by the canonical analysis configuration
pub const DEFAULT_SEED: u64 = 28;

/// Largest sample size considered statistically inadequate for padding
pub const MIN_ADEQUATE_SIZE: usize = 25;

/// What the reconciler is allowed to do with an undersized sample.
///
/// The size ceiling (subsampling down to the target) and the heavy
/// with-replacement correction for large deficits apply in every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Only enforce the ceiling; small deficits pass through
    Truncate,
    /// Pad small deficits by drawing with replacement
    ResampleWithReplacement,
    /// Pad small deficits by drawing without replacement
    ResampleWithoutReplacement,
    /// Never pad; only the ceiling and heavy-deficit corrections apply
    PassThrough,
}

/// How a sample's size was adjusted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Downsampled,
    PaddedWithReplacement,
    PaddedWithoutReplacement,
    Unchanged,
}

/// A sample whose length has been adjusted toward the target size.
///
/// `len == target` whenever the input was large enough to support the
/// adjustment; inadequate inputs are carried through unchanged.
#[derive(Debug, Clone)]
pub struct ReconciledSample {
    label: String,
    values: Array1<f64>,
    outcome: ReconcileOutcome,
}

impl ReconciledSample {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    pub fn into_values(self) -> Array1<f64> {
        self.values
    }

    pub fn outcome(&self) -> ReconcileOutcome {
        self.outcome
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.values.mean().unwrap_or(f64::NAN)
    }
}

fn rng_for(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(s) => ChaCha20Rng::seed_from_u64(s),
        None => ChaCha20Rng::from_entropy(),
    }
}

fn draw_with_replacement(values: &[f64], count: usize, rng: &mut ChaCha20Rng) -> Vec<f64> {
    (0..count).map(|_| values[rng.gen_range(0..values.len())]).collect()
}

/// Adjust a cleaned sample toward `cells * measurements_per_cell` values.
///
/// Policy, in precedence order:
/// - above the target: uniform subsample without replacement down to the
///   target, regardless of mode (the target is a ceiling);
/// - more than half short of the target (and above the adequacy floor):
///   draw the deficit with replacement, concatenate, shuffle;
/// - short of the target by less than half: pad per the mode, without
///   replacement where requested (falling back to with-replacement when the
///   deficit exceeds the pool), otherwise pass through;
/// - at the target, or at or below [`MIN_ADEQUATE_SIZE`]: unchanged.
///
/// Every branch honors `seed`; `None` draws from OS entropy for callers who
/// want run-to-run variability. The output order is shuffled whenever values
/// are drawn; no ordering guarantee is offered. The input is never mutated.
pub fn reconcile(
    sample: &CleanedSample,
    cells: usize,
    measurements_per_cell: usize,
    mode: ReconcileMode,
    seed: Option<u64>,
) -> ReconciledSample {
    let target = cells * measurements_per_cell;
    let n = sample.len();
    let values = sample.to_vec();
    let mut rng = rng_for(seed);

    let (adjusted, outcome) = if n > target {
        let picked: Vec<f64> = values.choose_multiple(&mut rng, target).copied().collect();
        (picked, ReconcileOutcome::Downsampled)
    } else if n > MIN_ADEQUATE_SIZE && n <= target / 2 {
        let deficit = target - n;
        let mut combined = draw_with_replacement(&values, deficit, &mut rng);
        combined.extend_from_slice(&values);
        combined.shuffle(&mut rng);
        (combined, ReconcileOutcome::PaddedWithReplacement)
    } else if n > MIN_ADEQUATE_SIZE && n < target {
        let deficit = target - n;
        match mode {
            ReconcileMode::ResampleWithoutReplacement if deficit <= n => {
                let mut combined: Vec<f64> =
                    values.choose_multiple(&mut rng, deficit).copied().collect();
                combined.extend_from_slice(&values);
                combined.shuffle(&mut rng);
                (combined, ReconcileOutcome::PaddedWithoutReplacement)
            }
            // deficits above the pool size normally land in the heavy
            // branch first; this guard covers degenerate targets
            ReconcileMode::ResampleWithoutReplacement => {
                log::warn!(
                    "{}: deficit {} exceeds pool {}, padding with replacement instead",
                    sample.label(),
                    deficit,
                    n
                );
                let mut combined = draw_with_replacement(&values, deficit, &mut rng);
                combined.extend_from_slice(&values);
                combined.shuffle(&mut rng);
                (combined, ReconcileOutcome::PaddedWithReplacement)
            }
            ReconcileMode::ResampleWithReplacement => {
                let mut combined = draw_with_replacement(&values, deficit, &mut rng);
                combined.extend_from_slice(&values);
                combined.shuffle(&mut rng);
                (combined, ReconcileOutcome::PaddedWithReplacement)
            }
            ReconcileMode::Truncate | ReconcileMode::PassThrough => {
                (values, ReconcileOutcome::Unchanged)
            }
        }
    } else {
        (values, ReconcileOutcome::Unchanged)
    };

    ReconciledSample {
        label: sample.label().to_string(),
        values: Array1::from_vec(adjusted),
        outcome,
    }
}
