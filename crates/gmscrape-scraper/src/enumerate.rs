//! Candidate discovery on the search results panel.

use std::time::Duration;

use crate::events::{ProgressSink, ScrapeEvent};
use crate::selectors;
use crate::session::CancelToken;
use crate::{BrowserError, BrowsingSession};

/// Outcome of one enumeration.
#[derive(Debug, Clone)]
pub struct Candidates<H> {
    /// Selected handles, at most the requested target, in panel order.
    pub handles: Vec<H>,
    /// How many listings were present before truncation.
    pub available: usize,
}

/// Time-boxed scroll-then-collect over the results panel.
///
/// Scrolling runs a fixed number of steps rather than until the list stops
/// growing, so the worst-case latency of enumeration is bounded.
#[derive(Debug, Clone, Copy)]
pub struct ListingEnumerator {
    pub panel_timeout: Duration,
    pub scroll_steps: u32,
    pub scroll_delay: Duration,
}

impl Default for ListingEnumerator {
    fn default() -> Self {
        Self {
            panel_timeout: Duration::from_secs(10),
            scroll_steps: 6,
            scroll_delay: Duration::from_secs(2),
        }
    }
}

impl ListingEnumerator {
    /// Up to `target` candidate handles in panel order.
    ///
    /// Listings are not deduplicated; the same place loaded twice is returned twice.
    ///
    /// A panel that never appears yields no candidates rather than an error.
    /// Cancellation is checked before every scroll step; once observed,
    /// scrolling stops and whatever is already loaded is collected.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::SessionLost`] when the browser goes away at
    /// any point; every other failure degrades to fewer candidates.
    pub async fn enumerate<B: BrowsingSession>(
        &self,
        browser: &mut B,
        target: usize,
        cancel: &CancelToken,
        sink: &dyn ProgressSink,
    ) -> Result<Candidates<B::Handle>, BrowserError> {
        let panel = match browser
            .wait_for_selector(selectors::RESULTS_PANEL, self.panel_timeout)
            .await
        {
            Ok(panel) => panel,
            Err(e) if e.is_session_lost() => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "results panel never appeared");
                return Ok(Candidates {
                    handles: Vec::new(),
                    available: 0,
                });
            }
        };

        for step in 1..=self.scroll_steps {
            if cancel.is_cancelled() {
                tracing::info!(step, "scrolling stopped by cancellation");
                break;
            }
            if let Err(e) = browser.scroll_to_bottom(&panel).await {
                if e.is_session_lost() {
                    return Err(e);
                }
                tracing::warn!(step, error = %e, "scroll failed, collecting what is loaded");
                break;
            }
            #[allow(clippy::cast_precision_loss)]
            let fraction = step as f32 / self.scroll_steps as f32;
            sink.emit(ScrapeEvent::ScrollProgress { fraction });
            tokio::time::sleep(self.scroll_delay).await;
        }

        let mut handles = match browser.find_all(selectors::LISTING_LINK).await {
            Ok(found) => found,
            Err(e) if e.is_session_lost() => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "listing lookup failed");
                Vec::new()
            }
        };
        let available = handles.len();
        handles.truncate(target);
        tracing::info!(available, selected = handles.len(), "listings enumerated");
        Ok(Candidates { handles, available })
    }
}
