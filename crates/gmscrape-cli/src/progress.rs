//! Console rendering of session events.

use gmscrape_scraper::ScrapeEvent;

/// One console line for `event`. Scroll progress is only reported when a step
/// completes the scroll phase, to keep the output readable.
pub(crate) fn describe(event: &ScrapeEvent) -> Option<String> {
    let line = match event {
        ScrapeEvent::Started { query, location } => {
            format!("searching \"{query}\" in {location}")
        }
        ScrapeEvent::ScrollProgress { fraction } => {
            if *fraction < 1.0 {
                return None;
            }
            "results loaded".to_string()
        }
        ScrapeEvent::ListingsFound {
            available,
            selected,
        } => format!("found {available} listings, processing {selected}"),
        ScrapeEvent::ItemExtracted {
            record,
            running_total,
        } => format!(
            "[{running_total}] {} | {} | {}",
            record.name, record.phone, record.address
        ),
        ScrapeEvent::ItemSkipped { index, reason } => format!("skipped #{index}: {reason}"),
        ScrapeEvent::Flushed {
            bundle_path,
            total_written,
            with_phone,
        } => format!(
            "saved {total_written} records ({with_phone} with phone) to {}",
            bundle_path.display()
        ),
        ScrapeEvent::FlushFailed { reason } => format!("could not save results: {reason}"),
        ScrapeEvent::Completed { final_count } => {
            format!("completed with {final_count} records")
        }
        ScrapeEvent::Cancelled { final_count } => {
            format!("cancelled with {final_count} records")
        }
        ScrapeEvent::Failed { reason } => format!("failed: {reason}"),
    };
    Some(line)
}
