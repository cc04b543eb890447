//! Human-readable text report.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use gmscrape_core::ResultRecord;

const RULE_WIDTH: usize = 80;

/// Render the plain-text report: header with query, location and generation
/// time, summary counts, then one numbered block per record.
#[must_use]
pub fn render_report(
    query: &str,
    location: &str,
    generated_at: DateTime<Local>,
    records: &[ResultRecord],
) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let with_phone = records.iter().filter(|r| r.has_phone()).count();

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "REPORTE: {}", query.to_uppercase());
    let _ = writeln!(out, "UBICACIÓN: {location}");
    let _ = writeln!(out, "FECHA: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{heavy}\n");
    let _ = writeln!(out, "Total: {}", records.len());
    let _ = writeln!(out, "Con teléfono: {with_phone}\n");
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "LISTADO COMPLETO");
    let _ = writeln!(out, "{heavy}\n");

    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, record.name);
        let _ = writeln!(out, "   Tipo: {}", record.category);
        let _ = writeln!(out, "   Dirección: {}", record.address);
        let _ = writeln!(out, "   Teléfono: {}", record.phone);
        let _ = writeln!(out, "   Website: {}", record.website);
        let _ = writeln!(out, "   Rating: {} ({})", record.rating, record.review_count);
        let _ = writeln!(out, "\n{light}\n");
    }

    out
}
