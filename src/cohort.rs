//! Longitudinal cohort assembly
//!
//! Joins every subject's cleaned samples across the canonical timepoint
//! schedule into one tidy table: a record per (subject, timepoint) with the
//! reconciled measurements, their mean, and quartile-membership counts
//! relative to the subject's own pre-flight baseline.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1};

use crate::data::{CleanedSample, SubjectId, SubjectRoster};
use crate::error::{Result, TeloError};
use crate::reconcile::{reconcile, ReconcileMode, DEFAULT_SEED};
use crate::stats::quantile;
use crate::timepoint::{classify, FlightPhase, Timepoint};

/// Reconciliation settings applied to every located sample
#[derive(Debug, Clone)]
pub struct AssemblyConfig {
    pub cells: usize,
    pub measurements_per_cell: usize,
    pub mode: ReconcileMode,
    pub seed: Option<u64>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            cells: 30,
            measurements_per_cell: 184,
            mode: ReconcileMode::ResampleWithoutReplacement,
            seed: Some(DEFAULT_SEED),
        }
    }
}

/// One row of the assembled longitudinal table
#[derive(Debug, Clone)]
pub struct LongitudinalRecord {
    subject: SubjectId,
    ordinal: Option<u32>,
    timepoint: Timepoint,
    phase: FlightPhase,
    values: Array1<f64>,
    mean: f64,
    /// Measurements at or below the reference's 25th percentile
    below_q1: usize,
    /// Measurements strictly inside the reference's interquartile range
    within_iqr: usize,
    /// Measurements at or above the reference's 75th percentile
    above_q3: usize,
}

impl LongitudinalRecord {
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn ordinal(&self) -> Option<u32> {
        self.ordinal
    }

    pub fn timepoint(&self) -> Timepoint {
        self.timepoint
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn below_q1(&self) -> usize {
        self.below_q1
    }

    pub fn within_iqr(&self) -> usize {
        self.within_iqr
    }

    pub fn above_q3(&self) -> usize {
        self.above_q3
    }
}

/// Count how many of `current`'s values fall at/below the reference's 25th
/// percentile, strictly between the 25th and 75th, and at/above the 75th.
///
/// Assignment takes the boundaries in that precedence, so the three counts
/// always partition `current` exactly, including the degenerate case where
/// the two boundaries coincide.
pub fn quartile_counts(reference: &[f64], current: &[f64]) -> (usize, usize, usize) {
    let q1 = quantile(reference, 0.25);
    let q3 = quantile(reference, 0.75);

    let mut below = 0;
    let mut within = 0;
    let mut above = 0;
    for &v in current {
        if v <= q1 {
            below += 1;
        } else if v >= q3 {
            above += 1;
        } else {
            within += 1;
        }
    }
    (below, within, above)
}

/// Assemble the longitudinal table for one cohort.
///
/// Each sample label is matched to a roster subject and classified into the
/// canonical schedule; unmatched or unclassifiable samples are excluded with
/// a warning, and a duplicate (subject, timepoint) keeps the first sample
/// seen. Located samples are reconciled before the mean and quartile counts
/// are computed. Pre-flight records compare against themselves; later
/// records compare against the subject's earliest pre-flight sample, or
/// against themselves when the subject has none.
///
/// The output is sorted by (subject ordinal, canonical timepoint order),
/// with ordinal-less subjects after the rest in id order, and holds at most
/// one record per (subject, timepoint).
pub fn assemble(
    samples: &[CleanedSample],
    roster: &SubjectRoster,
    config: &AssemblyConfig,
) -> Result<Vec<LongitudinalRecord>> {
    // (roster position, timepoint rank) -> located sample
    let mut located: BTreeMap<(usize, usize), (&CleanedSample, Timepoint, FlightPhase)> =
        BTreeMap::new();

    for sample in samples {
        let position = match roster
            .subjects()
            .iter()
            .position(|s| sample.label().contains(s.id().token()))
        {
            Some(p) => p,
            None => {
                log::warn!("'{}' matches no {} roster id, excluded", sample.label(), roster.cohort());
                continue;
            }
        };
        let (timepoint, phase) = match classify(sample.label()) {
            Ok(hit) => hit,
            Err(TeloError::NoTimepointMatch { label }) => {
                log::warn!("'{}' matches no canonical timepoint, excluded", label);
                continue;
            }
            Err(e) => return Err(e),
        };

        let key = (position, timepoint.rank());
        if located.contains_key(&key) {
            log::warn!(
                "duplicate sample for subject {} at {}, keeping the first ('{}' dropped)",
                roster.subjects()[position].id(),
                timepoint,
                sample.label()
            );
            continue;
        }
        located.insert(key, (sample, timepoint, phase));
    }

    let mut records = Vec::new();

    for (position, subject) in roster.subjects().iter().enumerate() {
        // reconcile this subject's samples in schedule order
        let mut reconciled: Vec<(Timepoint, FlightPhase, Vec<f64>)> = Vec::new();
        for (sample, timepoint, phase) in located
            .range((position, 0)..(position + 1, 0))
            .map(|(_, hit)| hit)
        {
            let r = reconcile(
                sample,
                config.cells,
                config.measurements_per_cell,
                config.mode,
                config.seed,
            );
            reconciled.push((*timepoint, *phase, r.to_vec()));
        }
        if reconciled.is_empty() {
            continue;
        }

        // earliest canonical pre-flight sample anchors the quartile counts
        let baseline: Option<Vec<f64>> = reconciled
            .iter()
            .find(|(_, phase, _)| *phase == FlightPhase::PreFlight)
            .map(|(_, _, values)| values.clone());

        for (timepoint, phase, values) in reconciled {
            let reference: &[f64] = match (&phase, &baseline) {
                (FlightPhase::PreFlight, _) | (_, None) => &values,
                (_, Some(base)) => base,
            };
            let (below_q1, within_iqr, above_q3) = quartile_counts(reference, &values);

            let mean = if values.is_empty() {
                f64::NAN
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };

            records.push(LongitudinalRecord {
                subject: subject.id().clone(),
                ordinal: subject.ordinal(),
                timepoint,
                phase,
                values: Array1::from_vec(values),
                mean,
                below_q1,
                within_iqr,
                above_q3,
            });
        }
    }

    if records.is_empty() {
        return Err(TeloError::EmptyData {
            reason: format!("no sample could be placed on the {} roster", roster.cohort()),
        });
    }

    records.sort_by(|a, b| {
        let ka = (a.ordinal.unwrap_or(u32::MAX), a.subject.token().to_string(), a.timepoint.rank());
        let kb = (b.ordinal.unwrap_or(u32::MAX), b.subject.token().to_string(), b.timepoint.rank());
        ka.cmp(&kb)
    });

    Ok(records)
}
