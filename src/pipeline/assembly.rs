//! Final list combining website-verified records with the top OSINT picks.

use crate::core::models::ExecutiveRecord;
use crate::pipeline::dedup::{normalize_company_key, normalize_person_name};
use crate::pipeline::emails::generate_for_record;
use crate::pipeline::osint::SOURCE_YOUTUBE;
use std::collections::HashSet;

/// Website-verified records first (`100%`), then the OSINT picks with their
/// evidence and confidence carried into the assembly columns.
pub fn assemble_verified_with_osint(
    records: &[ExecutiveRecord],
    osint_top: &[ExecutiveRecord],
) -> Vec<ExecutiveRecord> {
    let verified = records
        .iter()
        .filter(|r| r.employment_verified)
        .cloned()
        .map(|mut r| {
            r.verified_confidence = "100%".to_string();
            r
        });

    let osint = osint_top.iter().cloned().map(|mut r| {
        r.verification_source = SOURCE_YOUTUBE.to_string();
        r.evidence = r.osint_evidence.clone();
        r.verified_confidence = format!("{}%", r.osint_confidence.unwrap_or(0));
        r
    });

    let assembled: Vec<ExecutiveRecord> = verified.chain(osint).collect();
    tracing::info!(target: "assembly_task", "Assembled {} records", assembled.len());
    assembled
}

/// One row per person in assembly order (first occurrence wins), capped at
/// `limit`, with candidate emails generated again for the kept rows.
pub fn select_final_top(assembled: &[ExecutiveRecord], limit: usize) -> Vec<ExecutiveRecord> {
    let mut seen = HashSet::new();
    let mut top: Vec<ExecutiveRecord> = assembled
        .iter()
        .filter(|r| {
            seen.insert((
                normalize_person_name(&r.name),
                normalize_company_key(&r.company),
            ))
        })
        .take(limit)
        .cloned()
        .collect();

    let with_email = top
        .iter_mut()
        .filter_map(generate_for_record)
        .count();
    tracing::info!(target: "assembly_task",
        "Final top list: {} of {} assembled rows ({} with emails)",
        top.len(), assembled.len(), with_email
    );
    top
}
