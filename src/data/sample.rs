//! Cleaned per-sample measurement sequences

use ndarray::{Array1, ArrayView1};

use crate::error::{Result, TeloError};

/// One sample's telomere-length measurements after cleaning and calibration.
///
/// Order is stable but carries no meaning once cleaning has run. Every value
/// is finite; the extractor rejects anything beyond 3 standard deviations of
/// the raw sample's own mean before construction.
#[derive(Debug, Clone)]
pub struct CleanedSample {
    /// Source label the sample was read under (file stem, e.g.
    /// "dso5163 mphase TeloFISH L-270")
    label: String,
    /// Calibrated measurements
    values: Array1<f64>,
}

impl CleanedSample {
    /// Create a cleaned sample, validating that every measurement is finite
    pub fn new(label: impl Into<String>, values: Array1<f64>) -> Result<Self> {
        let label = label.into();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(TeloError::InvalidInput {
                reason: format!("sample '{}' contains non-finite measurements", label),
            });
        }
        Ok(Self { label, values })
    }

    /// Convenience constructor from a plain vector
    pub fn from_values(label: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        Self::new(label, Array1::from_vec(values))
    }

    /// Source label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Measurements as a view
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Measurements copied into a plain vector
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    /// Number of measurements
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the sample holds no measurements
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean telomere length, NaN when empty
    pub fn mean(&self) -> f64 {
        self.values.mean().unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cleaned_sample_accessors() {
        let s = CleanedSample::new("dso5163 L-270", array![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.label(), "dso5163 L-270");
        assert_eq!(s.len(), 3);
        assert!((s.mean() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_rejected() {
        let result = CleanedSample::new("bad", array![1.0, f64::NAN]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_sample_allowed() {
        let s = CleanedSample::from_values("empty", vec![]).unwrap();
        assert!(s.is_empty());
        assert!(s.mean().is_nan());
    }
}
