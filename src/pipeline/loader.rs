//! Raw input loading with repair of rows that carry an extra column.

use crate::core::error::{AppError, Result};
use crate::core::models::ExecutiveRecord;
use std::path::Path;

/// Minimum field count for a positional repair of an over-long row.
const MIN_REPAIRABLE_FIELDS: usize = 5;

#[derive(Debug, Default)]
struct ColumnIndex {
    name: Option<usize>,
    title: Option<usize>,
    company: Option<usize>,
    youtube_url: Option<usize>,
}

impl ColumnIndex {
    fn from_header(header: &csv::StringRecord) -> Self {
        let mut idx = ColumnIndex::default();
        for (i, col) in header.iter().enumerate() {
            match col.trim().to_lowercase().as_str() {
                "name" => idx.name = idx.name.or(Some(i)),
                "title" => idx.title = idx.title.or(Some(i)),
                "company" => idx.company = idx.company.or(Some(i)),
                "youtube url" => idx.youtube_url = idx.youtube_url.or(Some(i)),
                _ => {}
            }
        }
        idx
    }
}

fn field(row: &csv::StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn drop_nan(value: &str) -> &str {
    let v = value.trim();
    if v.eq_ignore_ascii_case("nan") {
        ""
    } else {
        v
    }
}

/// Rebuilds a row that has more fields than the header:
/// `name, title, company, extra, url, ...`.
fn repair_row(row: &csv::StringRecord) -> ExecutiveRecord {
    let get = |i: usize| row.get(i).unwrap_or("").trim();
    let company = drop_nan(get(2));
    let extra = drop_nan(get(3));
    let merged_company = match (company.is_empty(), extra.is_empty()) {
        (false, false) => format!("{} — {}", company, extra),
        (false, true) => company.to_string(),
        (true, false) => extra.to_string(),
        (true, true) => String::new(),
    };
    ExecutiveRecord {
        name: get(0).to_string(),
        title: get(1).to_string(),
        company: merged_company,
        youtube_url: get(4).to_string(),
        ..ExecutiveRecord::default()
    }
}

/// Loads the raw scraped table.
///
/// Every kept row gets `Original Order` set to its position among the data
/// rows of the file.
pub fn load_raw_records(path: &Path) -> Result<Vec<ExecutiveRecord>> {
    if !path.is_file() {
        return Err(AppError::InsufficientInput(format!(
            "Input file not found: {}",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_path(path)?;
    let header = reader.headers()?.clone();
    let columns = ColumnIndex::from_header(&header);
    if columns.name.is_none() {
        tracing::warn!(target: "loader_task", "Input header has no 'Name' column: {:?}", header);
    }

    let mut records = Vec::new();
    let mut repaired = 0usize;
    let mut dropped = 0usize;
    for (position, row) in reader.records().enumerate() {
        let row = row?;
        let mut record = if row.len() <= header.len() {
            ExecutiveRecord {
                name: field(&row, columns.name),
                title: field(&row, columns.title),
                company: field(&row, columns.company),
                youtube_url: field(&row, columns.youtube_url),
                ..ExecutiveRecord::default()
            }
        } else if row.len() >= MIN_REPAIRABLE_FIELDS {
            repaired += 1;
            tracing::debug!(target: "loader_task", "Repairing row {} with {} fields", position, row.len());
            repair_row(&row)
        } else {
            dropped += 1;
            tracing::warn!(target: "loader_task",
                "Dropping malformed row {} ({} fields, header has {})", position, row.len(), header.len());
            continue;
        };
        record.original_order = Some(position);
        records.push(record);
    }

    tracing::info!(target: "loader_task",
        "Loaded {} rows from {} ({} repaired, {} dropped)",
        records.len(), path.display(), repaired, dropped
    );
    Ok(records)
}
