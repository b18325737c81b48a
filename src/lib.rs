//! telofish: longitudinal telomere-length cohort assembly and analysis
//!
//! Turns per-sample telomere-length exports from TeloFISH imaging into a
//! tidy longitudinal table: measurements are cleaned and calibrated per
//! subject, classified into the canonical pre/mid/post-flight schedule,
//! resampled to a common size, and joined into one record per (subject,
//! timepoint) with quartile counts against the subject's pre-flight
//! baseline. Between-timepoint Mann-Whitney tests run on the assembled
//! table.
//!
//! # Example
//!
//! ```ignore
//! use telofish::prelude::*;
//!
//! // Load and extract a directory of exports
//! let registry = CalibrationRegistry::astronauts();
//! let samples = load_cohort_dir("exports/astros", &registry, &LoadOptions::default())?;
//!
//! // Assemble the longitudinal table
//! let records = assemble(&samples, &SubjectRoster::astronauts(), &AssemblyConfig::default())?;
//!
//! // Test timepoints against each other
//! let results = compare_by_subject(&records);
//! ```

pub mod calibration;
pub mod cli;
pub mod cohort;
pub mod data;
pub mod error;
pub mod extract;
pub mod io;
pub mod reconcile;
pub mod stats;
pub mod testing;
pub mod timepoint;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::calibration::{CalibrationRegistry, CalibrationRule, POPULATION_BEAD_DIVISOR};
    pub use crate::cohort::{assemble, quartile_counts, AssemblyConfig, LongitudinalRecord};
    pub use crate::data::{CleanedSample, Cohort, Subject, SubjectId, SubjectRoster};
    pub use crate::error::{Result, TeloError};
    pub use crate::extract::{
        extract, extract_cell_means, CellMeansTemplate, ExtractionTemplate, RawMeasurementTable,
    };
    pub use crate::io::{
        load_cohort_dir, read_raw_table, write_cohort_table, write_comparisons, LoadOptions,
    };
    pub use crate::reconcile::{
        reconcile, ReconcileMode, ReconcileOutcome, ReconciledSample, DEFAULT_SEED,
    };
    pub use crate::testing::{
        compare_by_subject, compare_timepoints, mann_whitney_u, MannWhitney, SubjectComparisons,
        TimepointComparison,
    };
    pub use crate::timepoint::{
        classify, FlightPhase, MidSlot, Timepoint, CANONICAL_TIMEPOINTS,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    fn ramp(n: usize, offset: f64) -> Vec<f64> {
        (0..n).map(|i| offset + i as f64).collect()
    }

    #[test]
    fn test_full_pipeline() {
        // Two astronauts with longitudinal samples, one unknown label
        let samples = vec![
            CleanedSample::from_values("dso5163 mphase TeloFISH L-270", ramp(4000, 50.0)).unwrap(),
            CleanedSample::from_values("dso5163 mphase TeloFISH FD90", ramp(3000, 40.0)).unwrap(),
            CleanedSample::from_values("dso5163 mphase TeloFISH FD140", ramp(2000, 30.0)).unwrap(),
            CleanedSample::from_values("dso5163 mphase TeloFISH R+270", ramp(6000, 20.0)).unwrap(),
            CleanedSample::from_values("dso2171 mphase TeloFISH L-180", ramp(4000, 100.0)).unwrap(),
            CleanedSample::from_values("dso2171 mphase TeloFISH R+180", ramp(4000, 90.0)).unwrap(),
            CleanedSample::from_values("unlabeled export", ramp(4000, 0.0)).unwrap(),
        ];

        let records = assemble(
            &samples,
            &SubjectRoster::astronauts(),
            &AssemblyConfig::default(),
        )
        .unwrap();

        // the unknown label is excluded; everything else is present once
        assert_eq!(records.len(), 6);
        let mut seen = std::collections::HashSet::new();
        for r in &records {
            assert!(seen.insert((r.subject().token().to_string(), r.timepoint())));
        }

        // canonical reconciliation target reached everywhere
        assert!(records.iter().all(|r| r.len() == 5520));

        // quartile counts partition every record
        for r in &records {
            assert_eq!(r.below_q1() + r.within_iqr() + r.above_q3(), r.len());
        }

        // subject 5163 (ordinal 1) sorts before 2171 (ordinal 5)
        assert_eq!(records[0].subject().token(), "5163");
        assert_eq!(records[0].timepoint(), Timepoint::L270);
        assert_eq!(records[5].subject().token(), "2171");

        // both mid slots present: the full six-way comparison grid runs
        let by_subject = compare_by_subject(&records);
        assert_eq!(by_subject.len(), 2);
        assert_eq!(by_subject[0].comparisons.len(), 6);
        assert_eq!(by_subject[1].comparisons.len(), 1);
        for s in &by_subject {
            for c in &s.comparisons {
                assert!((0.0..=1.0).contains(&c.test.p_value));
            }
        }
    }

    #[test]
    fn test_pipeline_is_reproducible_with_fixed_seed() {
        let samples = vec![
            CleanedSample::from_values("dso5163 mphase TeloFISH L-270", ramp(4000, 50.0)).unwrap(),
            CleanedSample::from_values("dso5163 mphase TeloFISH R+270", ramp(6000, 20.0)).unwrap(),
        ];
        let config = AssemblyConfig::default();
        let roster = SubjectRoster::astronauts();

        let a = assemble(&samples, &roster, &config).unwrap();
        let b = assemble(&samples, &roster, &config).unwrap();
        for (ra, rb) in a.iter().zip(b.iter()) {
            assert_eq!(ra.values().to_vec(), rb.values().to_vec());
            assert_eq!(ra.mean(), rb.mean());
        }
    }
}
