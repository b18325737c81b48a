//! Per-subject fluorescence calibration
//!
//! Different subjects were imaged in different microscope sessions, each with
//! its own Cy3 bead calibration, so raw intensities are standardized by a
//! per-subject divisor before any cross-sample comparison. Unknown subjects
//! get the identity divisor: leaving a sample unscaled is the documented
//! policy, not an error.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::Cohort;
use crate::error::{Result, TeloError};

/// Mean of all Cy3-calibrated control measurements; divides per-cell values
/// when expressing them relative to the control population.
pub const POPULATION_BEAD_DIVISOR: f64 = 116.184_815_3;

/// One substring-match calibration rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationRule {
    /// Subject token looked for in the sample label
    pub pattern: String,
    /// Positive scale divisor for that subject's imaging sessions
    pub divisor: f64,
}

/// Ordered calibration lookup for one cohort.
///
/// Rules are evaluated first-match-wins against the sample label. The two
/// cohorts keep separate registries; their token alphabets are disjoint but
/// close enough to collide under a shared table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationRegistry {
    cohort: Cohort,
    rules: Vec<CalibrationRule>,
}

const ASTRONAUT_RULES: [(&str, f64); 6] = [
    ("5163", 59.86),
    ("1536", 59.86),
    ("2171", 80.5),
    ("7673", 2.11),
    ("2479", 2.18),
    ("1261", 2.16),
];

const CONTROL_RULES: [(&str, f64); 6] = [
    ("0397", 2.285),
    ("3907", 2.179),
    ("1826", 2.143),
    ("0100", 59.86),
    ("0912", 80.5),
    ("0646", 80.5),
];

impl CalibrationRegistry {
    /// Built-in astronaut-session calibrations
    pub fn astronauts() -> Self {
        Self::from_table(Cohort::Astronaut, &ASTRONAUT_RULES)
    }

    /// Built-in control-session calibrations
    pub fn controls() -> Self {
        Self::from_table(Cohort::Control, &CONTROL_RULES)
    }

    /// Built-in registry for a cohort
    pub fn for_cohort(cohort: Cohort) -> Self {
        match cohort {
            Cohort::Astronaut => Self::astronauts(),
            Cohort::Control => Self::controls(),
        }
    }

    fn from_table(cohort: Cohort, table: &[(&str, f64)]) -> Self {
        let rules = table
            .iter()
            .map(|&(pattern, divisor)| CalibrationRule {
                pattern: pattern.to_string(),
                divisor,
            })
            .collect();
        Self { cohort, rules }
    }

    /// Build a registry from explicit rules, validating the divisors
    pub fn from_rules(cohort: Cohort, rules: Vec<CalibrationRule>) -> Result<Self> {
        for rule in &rules {
            if !(rule.divisor.is_finite() && rule.divisor > 0.0) {
                return Err(TeloError::InvalidCalibration {
                    reason: format!(
                        "divisor for pattern '{}' must be positive and finite, got {}",
                        rule.pattern, rule.divisor
                    ),
                });
            }
            if rule.pattern.is_empty() {
                return Err(TeloError::InvalidCalibration {
                    reason: "empty match pattern".to_string(),
                });
            }
        }
        Ok(Self { cohort, rules })
    }

    /// Load a replacement rule table from a JSON file.
    ///
    /// Format: `[{"pattern": "5163", "divisor": 59.86}, ...]`
    pub fn from_json_file<P: AsRef<Path>>(cohort: Cohort, path: P) -> Result<Self> {
        let file = File::open(path)?;
        let rules: Vec<CalibrationRule> = serde_json::from_reader(BufReader::new(file))?;
        Self::from_rules(cohort, rules)
    }

    pub fn cohort(&self) -> Cohort {
        self.cohort
    }

    pub fn rules(&self) -> &[CalibrationRule] {
        &self.rules
    }

    /// Scale divisor for a sample label. First matching rule wins;
    /// unrecognized labels calibrate by 1.0.
    pub fn divisor_for(&self, label: &str) -> f64 {
        self.rules
            .iter()
            .find(|rule| label.contains(&rule.pattern))
            .map(|rule| rule.divisor)
            .unwrap_or(1.0)
    }
}
