//! Raw measurement-table extraction
//!
//! The imaging software exports one rectangular grid per sample. A fixed
//! column holds per-measurement telomere intensities, interleaved at a fixed
//! stride with counterstain (DAPI) rows that must be discarded, and wrapped
//! in header/footer rows outside the data block. Extraction reduces that
//! grid column to a cleaned, calibrated measurement sequence.

use std::collections::BTreeSet;

use ndarray::Array1;

use crate::data::CleanedSample;
use crate::error::{Result, TeloError};
use crate::stats::zscore_within;

/// Rows of the export template that hold DAPI counterstain intensities
/// rather than telomere lengths (stride 187 from row 5)
pub const COUNTERSTAIN_ROWS: [usize; 30] = [
    5, 192, 379, 566, 753, 940, 1127, 1314, 1501, 1688, 1875, 2062, 2249, 2436, 2623, 2810, 2997,
    3184, 3371, 3558, 3745, 3932, 4119, 4306, 4493, 4680, 4867, 5054, 5241, 5428,
];

/// Positional window of the data block after counterstain rows are gone
/// (start inclusive, end exclusive)
pub const VALUE_WINDOW: (usize, usize) = (7, 5611);

/// Zero-based index of the individual-telomere column in the export grid
pub const MEASUREMENT_COLUMN: usize = 3;

/// Z-score magnitude at and beyond which a measurement is rejected
pub const OUTLIER_Z_CUTOFF: f64 = 3.0;

/// One sample's full raw export: the measurement column as unparsed cells,
/// in file order. Blank and textual cells are legal; coercion drops them.
#[derive(Debug, Clone)]
pub struct RawMeasurementTable {
    label: String,
    cells: Vec<String>,
}

impl RawMeasurementTable {
    pub fn new(label: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            label: label.into(),
            cells,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Which rows of the export grid to discard and where the data block sits
#[derive(Debug, Clone)]
pub struct ExtractionTemplate {
    /// Row indices (into the original export) to drop before windowing
    pub drop_rows: BTreeSet<usize>,
    /// Positional (start, end) window applied after the drop
    pub value_window: (usize, usize),
}

impl Default for ExtractionTemplate {
    fn default() -> Self {
        Self {
            drop_rows: COUNTERSTAIN_ROWS.iter().copied().collect(),
            value_window: VALUE_WINDOW,
        }
    }
}

/// Layout of the per-cell summary export: a short column of mean telomere
/// length per cell under a few header rows
#[derive(Debug, Clone)]
pub struct CellMeansTemplate {
    /// Header rows above the first cell row
    pub skip_rows: usize,
    /// Number of cell rows to read
    pub cells: usize,
}

impl Default for CellMeansTemplate {
    fn default() -> Self {
        Self {
            skip_rows: 3,
            cells: 30,
        }
    }
}

/// Extract a cleaned, calibrated sample from one raw export table.
///
/// Counterstain rows are dropped by their original index, the positional
/// window is applied to what remains, surviving cells are coerced to numbers
/// (failures become missing and are dropped), measurements beyond
/// [`OUTLIER_Z_CUTOFF`] standard deviations of the sample's own mean are
/// rejected, and the rest are divided by the calibration divisor. The
/// z-filter runs before division; z-scores are scale-invariant, so the
/// invariant holds on the calibrated values too.
///
/// A near-empty result is not an error here; downstream size policy decides
/// what to do with inadequate samples.
pub fn extract(
    table: &RawMeasurementTable,
    template: &ExtractionTemplate,
    calibration_divisor: f64,
) -> Result<CleanedSample> {
    if !(calibration_divisor.is_finite() && calibration_divisor > 0.0) {
        return Err(TeloError::InvalidInput {
            reason: format!(
                "calibration divisor for '{}' must be positive and finite, got {}",
                table.label(),
                calibration_divisor
            ),
        });
    }

    let (start, end) = template.value_window;
    let windowed = table
        .cells
        .iter()
        .enumerate()
        .filter(|(row, _)| !template.drop_rows.contains(row))
        .map(|(_, cell)| cell)
        .skip(start)
        .take(end.saturating_sub(start));

    let numeric: Vec<f64> = windowed
        .filter_map(|cell| cell.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect();

    let keep = zscore_within(&numeric, OUTLIER_Z_CUTOFF);
    let calibrated: Vec<f64> = numeric
        .iter()
        .zip(keep.iter())
        .filter(|(_, &k)| k)
        .map(|(v, _)| v / calibration_divisor)
        .collect();

    let dropped = numeric.len() - calibrated.len();
    if dropped > 0 {
        log::debug!(
            "{}: rejected {} outlier measurement(s) of {}",
            table.label(),
            dropped,
            numeric.len()
        );
    }

    CleanedSample::new(table.label(), Array1::from_vec(calibrated))
}

/// Extract the per-cell summary shape: mean telomere length for each of the
/// first `cells` cells, calibrated by the subject divisor and optionally
/// re-expressed against a population divisor (see
/// [`crate::calibration::POPULATION_BEAD_DIVISOR`]).
pub fn extract_cell_means(
    table: &RawMeasurementTable,
    template: &CellMeansTemplate,
    calibration_divisor: f64,
    population_divisor: Option<f64>,
) -> Result<CleanedSample> {
    if !(calibration_divisor.is_finite() && calibration_divisor > 0.0) {
        return Err(TeloError::InvalidInput {
            reason: format!(
                "calibration divisor for '{}' must be positive and finite, got {}",
                table.label(),
                calibration_divisor
            ),
        });
    }
    let pop = population_divisor.unwrap_or(1.0);
    if !(pop.is_finite() && pop > 0.0) {
        return Err(TeloError::InvalidInput {
            reason: format!("population divisor must be positive and finite, got {}", pop),
        });
    }

    let values: Vec<f64> = table
        .cells
        .iter()
        .skip(template.skip_rows)
        .take(template.cells)
        .filter_map(|cell| cell.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v / calibration_divisor / pop)
        .collect();

    CleanedSample::new(table.label(), Array1::from_vec(values))
}
