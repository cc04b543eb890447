//! The scrape session state machine.
//!
//! A session moves `Idle -> Running -> {Completed | Cancelled | Failed}`
//! exactly once. [`ScrapeSession::run`] is meant to be spawned on a worker
//! task; the foreground keeps a [`SessionHandle`] to observe the state and
//! request cancellation, and consumes [`ScrapeEvent`]s through a
//! [`ProgressSink`].

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gmscrape_core::{AppConfig, ResultRecord, ScrapeConfig};
use gmscrape_export::{OutputWriter, SessionOutputBundle};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::enumerate::ListingEnumerator;
use crate::events::{NullSink, ProgressSink, ScrapeEvent};
use crate::extract::FieldExtractor;
use crate::selectors;
use crate::{BrowserError, BrowserLauncher, BrowsingSession};

/// Characters left unescaped in search terms besides alphanumerics.
const SEARCH_TERM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Search URL for free-text `terms`: each whitespace-separated word is
/// percent-encoded and the words are joined with `+`.
#[must_use]
pub fn search_url(base: &str, terms: &str) -> String {
    let encoded: Vec<String> = terms
        .split_whitespace()
        .map(|word| utf8_percent_encode(word, SEARCH_TERM).to_string())
        .collect();
    format!("{base}{}", encoded.join("+"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Running = 1,
    Completed = 2,
    Cancelled = 3,
    Failed = 4,
}

impl SessionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Cancelled,
            4 => Self::Failed,
            _ => Self::Idle,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    #[must_use]
    pub fn can_transition_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed | Self::Cancelled | Self::Failed)
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cooperative cancellation flag shared between the worker and any number
/// of observers. Setting it is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Foreground view of a session: read its state and record count, request
/// cancellation. The records themselves arrive through
/// [`ScrapeEvent::ItemExtracted`] and the final [`SessionReport`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    cancel: CancelToken,
    state: Arc<AtomicU8>,
    collected: Arc<AtomicUsize>,
}

impl SessionHandle {
    /// Request that the session stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Records extracted so far.
    #[must_use]
    pub fn records_collected(&self) -> usize {
        self.collected.load(Ordering::SeqCst)
    }
}

/// Timing and navigation policy, independent of any single search.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub search_base_url: String,
    /// Added to the per-item wait after navigating to the search.
    pub search_settle: Duration,
    pub detail_timeout: Duration,
    pub field_timeout: Duration,
    pub enumerator: ListingEnumerator,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            search_base_url: "https://www.google.com/maps/search/".to_string(),
            search_settle: Duration::from_secs(2),
            detail_timeout: Duration::from_secs(5),
            field_timeout: Duration::from_secs(2),
            enumerator: ListingEnumerator::default(),
        }
    }
}

impl SessionSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            search_base_url: config.search_base_url.clone(),
            search_settle: Duration::from_secs(config.search_settle_secs),
            detail_timeout: Duration::from_secs(config.detail_timeout_secs),
            field_timeout: Duration::from_secs(config.field_timeout_secs),
            enumerator: ListingEnumerator {
                panel_timeout: Duration::from_secs(config.panel_timeout_secs),
                scroll_steps: config.scroll_steps,
                scroll_delay: Duration::from_millis(config.scroll_delay_ms),
            },
        }
    }
}

/// Result of processing one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Extracted(ResultRecord),
    /// The candidate is dropped; the session continues.
    Skipped { reason: String },
    /// The browsing capability is gone; the session cannot continue.
    Fatal { reason: String },
}

impl ItemOutcome {
    fn from_browser_error(context: &str, err: &BrowserError) -> Self {
        let reason = format!("{context}: {err}");
        if err.is_session_lost() {
            Self::Fatal { reason }
        } else {
            Self::Skipped { reason }
        }
    }
}

/// Final summary returned by [`ScrapeSession::run`].
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub state: SessionState,
    /// Records in enumeration order.
    pub records: Vec<ResultRecord>,
    pub skipped: usize,
    /// Why the session failed, for [`SessionState::Failed`].
    pub failure: Option<String>,
    /// Present when records were flushed successfully.
    pub bundle: Option<SessionOutputBundle>,
    pub flush_error: Option<String>,
}

pub struct ScrapeSession<L> {
    config: ScrapeConfig,
    settings: SessionSettings,
    launcher: L,
    writer: OutputWriter,
    sink: Arc<dyn ProgressSink>,
    cancel: CancelToken,
    state: Arc<AtomicU8>,
    collected: Arc<AtomicUsize>,
}

impl<L> ScrapeSession<L>
where
    L: BrowserLauncher,
{
    #[must_use]
    pub fn new(config: ScrapeConfig, launcher: L, writer: OutputWriter) -> Self {
        Self {
            config,
            settings: SessionSettings::default(),
            launcher,
            writer,
            sink: Arc::new(NullSink),
            cancel: CancelToken::new(),
            state: Arc::new(AtomicU8::new(SessionState::Idle as u8)),
            collected: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            cancel: self.cancel.clone(),
            state: Arc::clone(&self.state),
            collected: Arc::clone(&self.collected),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn transition(&self, next: SessionState) {
        let current = self.state();
        if current.can_transition_to(next) {
            self.state.store(next as u8, Ordering::SeqCst);
            tracing::debug!(from = %current, to = %next, "session state changed");
        } else {
            tracing::warn!(from = %current, to = %next, "ignored invalid session transition");
        }
    }

    /// Drive the session to a terminal state.
    ///
    /// The browser is closed on every path once launched. Accumulated records
    /// are flushed exactly once, whichever terminal state is reached, when
    /// there is at least one. The terminal event is always the last one
    /// emitted.
    pub async fn run(self) -> SessionReport {
        self.transition(SessionState::Running);
        self.sink.emit(ScrapeEvent::Started {
            query: self.config.query().to_string(),
            location: self.config.location().to_string(),
        });
        tracing::info!(
            query = self.config.query(),
            location = self.config.location(),
            max_results = self.config.max_results(),
            "scrape session started"
        );

        let mut browser = match self.launcher.launch(self.config.headless()).await {
            Ok(browser) => browser,
            Err(e) => {
                return self.finish_failed(Vec::new(), 0, format!("browser unavailable: {e}")).await;
            }
        };

        let mut records = Vec::new();
        let mut skipped = 0;
        let failure = self.drive(&mut browser, &mut records, &mut skipped).await;

        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "failed to close browser");
        }

        match failure {
            Some(reason) => self.finish_failed(records, skipped, reason).await,
            None => {
                let state = if self.cancel.is_cancelled() {
                    SessionState::Cancelled
                } else {
                    SessionState::Completed
                };
                self.finish(state, records, skipped, None).await
            }
        }
    }

    /// Navigate, enumerate and process candidates. Returns the failure reason
    /// when the session must end in [`SessionState::Failed`].
    async fn drive<B: BrowsingSession>(
        &self,
        browser: &mut B,
        records: &mut Vec<ResultRecord>,
        skipped: &mut usize,
    ) -> Option<String> {
        let url = search_url(&self.settings.search_base_url, &self.config.search_terms());
        tracing::info!(url = %url, "opening search");
        if let Err(e) = browser.open(&url).await {
            return Some(format!("could not open search: {e}"));
        }

        let per_item_wait = Duration::from_secs(self.config.per_item_wait_secs());
        tokio::time::sleep(per_item_wait + self.settings.search_settle).await;

        let candidates = match self
            .settings
            .enumerator
            .enumerate(browser, self.config.max_results(), &self.cancel, self.sink.as_ref())
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!(error = %e, "browser lost while enumerating listings");
                return Some(format!("browser lost while enumerating listings: {e}"));
            }
        };
        self.sink.emit(ScrapeEvent::ListingsFound {
            available: candidates.available,
            selected: candidates.handles.len(),
        });

        let extractor = FieldExtractor::new(self.settings.field_timeout);
        for (i, handle) in candidates.handles.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(processed = i, "cancellation observed, stopping");
                break;
            }

            match self
                .process_candidate(browser, handle, &extractor, per_item_wait)
                .await
            {
                ItemOutcome::Extracted(record) => {
                    records.push(record.clone());
                    self.collected.store(records.len(), Ordering::SeqCst);
                    tracing::info!(index = i + 1, running_total = records.len(), "listing extracted");
                    self.sink.emit(ScrapeEvent::ItemExtracted {
                        record,
                        running_total: records.len(),
                    });
                }
                ItemOutcome::Skipped { reason } => {
                    *skipped += 1;
                    tracing::warn!(index = i + 1, reason = %reason, "listing skipped");
                    self.sink.emit(ScrapeEvent::ItemSkipped {
                        index: i + 1,
                        reason,
                    });
                }
                ItemOutcome::Fatal { reason } => {
                    tracing::error!(index = i + 1, reason = %reason, "browser lost mid-session");
                    return Some(reason);
                }
            }
        }
        None
    }

    /// Open one candidate and read it. Never returns an error: every failure
    /// becomes a skip, except a lost browser.
    async fn process_candidate<B: BrowsingSession>(
        &self,
        browser: &mut B,
        handle: &B::Handle,
        extractor: &FieldExtractor,
        per_item_wait: Duration,
    ) -> ItemOutcome {
        if let Err(e) = browser.click(handle).await {
            return ItemOutcome::from_browser_error("could not open listing", &e);
        }
        tokio::time::sleep(per_item_wait).await;

        match browser
            .wait_for_selector(selectors::DETAIL_MARKER, self.settings.detail_timeout)
            .await
        {
            Ok(_) => ItemOutcome::Extracted(extractor.extract(browser).await),
            Err(e) if e.is_timeout() => ItemOutcome::Skipped {
                reason: format!(
                    "detail view did not load within {:?}",
                    self.settings.detail_timeout
                ),
            },
            Err(e) => ItemOutcome::from_browser_error("detail view failed", &e),
        }
    }

    async fn finish_failed(
        &self,
        records: Vec<ResultRecord>,
        skipped: usize,
        reason: String,
    ) -> SessionReport {
        tracing::error!(reason = %reason, "scrape session failed");
        self.finish(SessionState::Failed, records, skipped, Some(reason))
            .await
    }

    async fn finish(
        &self,
        state: SessionState,
        records: Vec<ResultRecord>,
        skipped: usize,
        failure: Option<String>,
    ) -> SessionReport {
        let (bundle, flush_error) = self.flush(&records).await;
        self.transition(state);

        let final_count = records.len();
        let terminal = match (state, &failure) {
            (SessionState::Failed, Some(reason)) => ScrapeEvent::Failed {
                reason: reason.clone(),
            },
            (SessionState::Cancelled, _) => ScrapeEvent::Cancelled { final_count },
            _ => ScrapeEvent::Completed { final_count },
        };
        tracing::info!(state = %state, final_count, skipped, "scrape session finished");
        self.sink.emit(terminal);

        SessionReport {
            state,
            records,
            skipped,
            failure,
            bundle,
            flush_error,
        }
    }

    /// Persist `records` off the async runtime. Nothing is written for an
    /// empty session.
    async fn flush(
        &self,
        records: &[ResultRecord],
    ) -> (Option<SessionOutputBundle>, Option<String>) {
        if records.is_empty() {
            return (None, None);
        }

        let writer = self.writer.clone();
        let config = self.config.clone();
        let owned = records.to_vec();
        let result = tokio::task::spawn_blocking(move || writer.flush(&owned, &config)).await;

        let outcome = match result {
            Ok(Ok(bundle)) => Ok(bundle),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("flush task failed: {e}")),
        };
        match outcome {
            Ok(bundle) => {
                self.sink.emit(ScrapeEvent::Flushed {
                    bundle_path: bundle.directory.clone(),
                    total_written: bundle.total,
                    with_phone: bundle.with_phone,
                });
                (Some(bundle), None)
            }
            Err(reason) => {
                tracing::error!(reason = %reason, "failed to write session output");
                self.sink.emit(ScrapeEvent::FlushFailed {
                    reason: reason.clone(),
                });
                (None, Some(reason))
            }
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
