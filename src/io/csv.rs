//! CSV/TSV reading of raw measurement exports

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, TeloError};
use crate::extract::RawMeasurementTable;

/// Read one export grid, keeping a single column as unparsed cells.
///
/// The label is the file stem (which carries the subject token and the
/// timepoint). Comma and tab delimiters are auto-detected from the first
/// line; ragged rows are tolerated, a missing cell reads as blank. Failures
/// surface as [`TeloError::SourceUnreadable`] so batch callers can skip the
/// file and move on.
pub fn read_raw_table<P: AsRef<Path>>(path: P, column: usize) -> Result<RawMeasurementTable> {
    let path = path.as_ref();
    let label = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string();

    let unreadable = |reason: String| TeloError::SourceUnreadable {
        label: label.clone(),
        reason,
    };

    let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|e| unreadable(e.to_string()))?;
    let delimiter = if first_line.contains('\t') { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| unreadable(e.to_string()))?;

    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| unreadable(e.to_string()))?;
        cells.push(record.get(column).unwrap_or("").to_string());
    }

    if cells.is_empty() {
        return Err(unreadable("file holds no rows".to_string()));
    }

    Ok(RawMeasurementTable::new(label, cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_comma_separated() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "cell,area,dapi,telo").unwrap();
        writeln!(file, "1,2,3,101.5").unwrap();
        writeln!(file, "2,2,3,99.0").unwrap();

        let table = read_raw_table(file.path(), 3).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.cells()[1], "101.5");
    }

    #[test]
    fn test_read_tab_separated() {
        let mut file = NamedTempFile::with_suffix(".tsv").unwrap();
        writeln!(file, "cell\tarea\tdapi\ttelo").unwrap();
        writeln!(file, "1\t2\t3\t88.25").unwrap();

        let table = read_raw_table(file.path(), 3).unwrap();
        assert_eq!(table.cells()[1], "88.25");
    }

    #[test]
    fn test_ragged_rows_read_as_blank() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "a,b,c,d").unwrap();
        writeln!(file, "1,2").unwrap();
        writeln!(file, "1,2,3,42.0").unwrap();

        let table = read_raw_table(file.path(), 3).unwrap();
        assert_eq!(table.cells()[1], "");
        assert_eq!(table.cells()[2], "42.0");
    }

    #[test]
    fn test_missing_file_is_source_unreadable() {
        let result = read_raw_table("/nonexistent/dso5163 L-270.csv", 3);
        assert!(matches!(result, Err(TeloError::SourceUnreadable { .. })));
    }
}
