//! Reading raw measurement exports and writing assembled tables

mod csv;
mod results;

pub use self::csv::read_raw_table;
pub use results::{write_cohort_table, write_comparisons};

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::calibration::CalibrationRegistry;
use crate::data::CleanedSample;
use crate::error::{Result, TeloError};
use crate::extract::{extract, ExtractionTemplate, MEASUREMENT_COLUMN};

/// How to read one export file
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Zero-based column holding the individual measurements
    pub column: usize,
    /// Row layout of the export grid
    pub template: ExtractionTemplate,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            column: MEASUREMENT_COLUMN,
            template: ExtractionTemplate::default(),
        }
    }
}

fn is_measurement_file(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    // spreadsheet lock files and dotfiles are not data
    if name.starts_with("~$") || name.starts_with('.') {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("csv") | Some("tsv")
    )
}

/// Load and extract every measurement table in a directory.
///
/// Files are discovered in name order and extracted in parallel; a file
/// that cannot be read or parsed is logged and skipped rather than failing
/// the batch. Calibration divisors are resolved per file label against the
/// given registry. Erroring out only when nothing usable remains keeps one
/// corrupt export from discarding a whole collection run.
pub fn load_cohort_dir<P: AsRef<Path>>(
    dir: P,
    registry: &CalibrationRegistry,
    options: &LoadOptions,
) -> Result<Vec<CleanedSample>> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_measurement_file(p))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(TeloError::EmptyData {
            reason: format!("no measurement tables found in {}", dir.display()),
        });
    }

    let samples: Vec<CleanedSample> = paths
        .par_iter()
        .filter_map(|path| {
            let table = match read_raw_table(path, options.column) {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("skipping {}: {}", path.display(), e);
                    return None;
                }
            };
            log::info!("{}: acquiring telomere measurements", table.label());
            let divisor = registry.divisor_for(table.label());
            match extract(&table, &options.template, divisor) {
                Ok(sample) => Some(sample),
                Err(e) => {
                    log::warn!("skipping {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect();

    if samples.is_empty() {
        return Err(TeloError::EmptyData {
            reason: format!(
                "none of the {} table(s) in {} could be extracted",
                paths.len(),
                dir.display()
            ),
        });
    }

    Ok(samples)
}
