//! Writing assembled tables and test results

use std::path::Path;

use crate::cohort::LongitudinalRecord;
use crate::error::Result;
use crate::testing::SubjectComparisons;

/// Write the longitudinal table as CSV, one row per (subject, timepoint).
pub fn write_cohort_table<P: AsRef<Path>>(path: P, records: &[LongitudinalRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "subject id",
        "subject number",
        "timepoint",
        "flight status",
        "measurements",
        "mean telo length",
        "preF Q1 count",
        "preF Q2-3 count",
        "preF Q4 count",
    ])?;

    for record in records {
        writer.write_record([
            record.subject().token().to_string(),
            record
                .ordinal()
                .map(|n| n.to_string())
                .unwrap_or_default(),
            record.timepoint().to_string(),
            record.phase().to_string(),
            record.len().to_string(),
            format!("{:.6}", record.mean()),
            record.below_q1().to_string(),
            record.within_iqr().to_string(),
            record.above_q3().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write per-subject between-timepoint test results as CSV.
pub fn write_comparisons<P: AsRef<Path>>(
    path: P,
    comparisons: &[SubjectComparisons],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["subject id", "left", "right", "U", "p value"])?;

    for subject in comparisons {
        for c in &subject.comparisons {
            writer.write_record([
                subject.subject.token().to_string(),
                c.left.clone(),
                c.right.clone(),
                format!("{:.1}", c.test.u),
                format!("{:.6e}", c.test.p_value),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::{assemble, AssemblyConfig};
    use crate::data::{CleanedSample, SubjectRoster};
    use crate::reconcile::ReconcileMode;
    use tempfile::TempDir;

    #[test]
    fn test_write_cohort_table() {
        let samples = vec![
            CleanedSample::from_values(
                "dso5163 mphase TeloFISH L-270",
                (0..50).map(|i| i as f64).collect(),
            )
            .unwrap(),
            CleanedSample::from_values(
                "dso5163 mphase TeloFISH R+270",
                (0..50).map(|i| i as f64 + 3.0).collect(),
            )
            .unwrap(),
        ];
        let config = AssemblyConfig {
            cells: 5,
            measurements_per_cell: 10,
            mode: ReconcileMode::PassThrough,
            seed: Some(1),
        };
        let records = assemble(&samples, &SubjectRoster::astronauts(), &config).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cohort.csv");
        write_cohort_table(&path, &records).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("subject id,"));
        assert!(lines[1].contains("5163"));
        assert!(lines[1].contains("L-270"));
        assert!(lines[1].contains("Pre-Flight"));
        assert!(lines[2].contains("R+270"));
    }
}
