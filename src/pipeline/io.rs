//! CSV and text artifact reading/writing shared by every stage.

use crate::core::error::Result;
use crate::core::models::ExecutiveRecord;
use serde::Serialize;
use std::fs;
use std::path::Path;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tracing::debug!("Creating directory: {}", parent.display());
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Reads a stage artifact. Unknown columns are ignored and missing columns
/// take their defaults.
pub fn read_records(path: &Path) -> Result<Vec<ExecutiveRecord>> {
    tracing::debug!("Reading records from {}", path.display());
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize::<ExecutiveRecord>() {
        records.push(row?);
    }
    tracing::debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Writes rows with a header line. An empty slice still produces the header.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T], header: &[&str]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut writer = if rows.is_empty() {
        let mut w = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
        w.write_record(header)?;
        w
    } else {
        csv::Writer::from_path(path)?
    };
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    tracing::debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_records(path: &Path, records: &[ExecutiveRecord]) -> Result<()> {
    write_rows(path, records, &ExecutiveRecord::COLUMNS)
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{DomainNote, ResolutionConfidence};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_records_survive_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("records.csv");

        let mut rec = ExecutiveRecord::new("Jane Doe", "CMO", "Acme");
        rec.original_order = Some(3);
        rec.domain_notes = Some(DomainNote::VerifiedFromSlug);
        rec.confidence = Some(ResolutionConfidence::Medium);
        rec.employment_verified = true;
        rec.verified_at = NaiveDate::from_ymd_opt(2024, 5, 1);
        write_records(&path, &[rec.clone(), ExecutiveRecord::new("John Roe", "", "")]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("Original Order,Name,Title,Company"));
        assert!(raw.contains("verified_from_slug,medium"));
        assert!(raw.contains(",yes,"));

        let back = read_records(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0], rec);
        assert_eq!(back[1].original_order, None);
        assert!(!back[1].employment_verified);
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_records(&path, &[]).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 1);
        assert!(read_records(&path).unwrap().is_empty());
    }

    #[test]
    fn test_partial_columns_take_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        fs::write(&path, "Name,Title,Company,Extra\nJane Doe,CEO,Acme,ignored\n").unwrap();
        let recs = read_records(&path).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].name, "Jane Doe");
        assert!(recs[0].company_website.is_empty());
        assert_eq!(recs[0].domain_notes, None);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(read_records(&dir.path().join("nope.csv")).is_err());
    }
}
