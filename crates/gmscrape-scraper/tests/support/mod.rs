//! Scripted in-memory browser shared by the integration tests.
//!
//! A [`Page`] describes the search results and each listing's detail view;
//! [`FakeBrowser`] answers capability calls from it and records every call in
//! a shared log so tests can assert on ordering and on `close`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use gmscrape_scraper::selectors;
use gmscrape_scraper::{BrowserError, BrowserLauncher, BrowsingSession, SessionHandle};

#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// `None` means the detail marker never appears.
    pub detail: Option<Detail>,
    pub click_error: Option<BrowserError>,
}

#[derive(Debug, Clone, Default)]
pub struct Detail {
    pub texts: HashMap<&'static str, String>,
    pub attrs: HashMap<(&'static str, &'static str), String>,
    /// Selectors whose text read never returns.
    pub hangs: Vec<&'static str>,
    /// Detail-marker wait reports the browser as gone.
    pub lost: bool,
}

impl Detail {
    pub fn named(name: &str) -> Self {
        let mut detail = Self::default();
        detail.texts.insert(selectors::NAME, name.to_string());
        detail
    }

    pub fn text(mut self, selector: &'static str, value: &str) -> Self {
        self.texts.insert(selector, value.to_string());
        self
    }

    pub fn attr(mut self, selector: &'static str, attribute: &'static str, value: &str) -> Self {
        self.attrs.insert((selector, attribute), value.to_string());
        self
    }

    pub fn hang(mut self, selector: &'static str) -> Self {
        self.hangs.push(selector);
        self
    }

    pub fn lost(mut self) -> Self {
        self.lost = true;
        self
    }
}

impl Listing {
    pub fn ok(detail: Detail) -> Self {
        Self {
            detail: Some(detail),
            click_error: None,
        }
    }

    pub fn never_loads() -> Self {
        Self::default()
    }

    pub fn click_fails(err: BrowserError) -> Self {
        Self {
            detail: None,
            click_error: Some(err),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub panel_present: bool,
    /// Returned by the results-panel wait and the listing lookup.
    pub results_error: Option<BrowserError>,
    pub open_error: Option<BrowserError>,
    pub scroll_error: Option<BrowserError>,
    pub listings: Vec<Listing>,
}

impl Page {
    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            panel_present: true,
            results_error: None,
            open_error: None,
            scroll_error: None,
            listings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeHandle {
    Panel,
    Listing(usize),
    Field(usize, &'static str),
}

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub struct FakeBrowser {
    page: Page,
    current: Option<usize>,
    log: CallLog,
    cancel_on_click: Option<(usize, Arc<OnceLock<SessionHandle>>)>,
}

impl FakeBrowser {
    pub fn new(page: Page) -> (Self, CallLog) {
        let log = CallLog::default();
        (
            Self {
                page,
                current: None,
                log: Arc::clone(&log),
                cancel_on_click: None,
            },
            log,
        )
    }

    /// Make the browser show listing `index` as if it had been clicked.
    pub fn show(&mut self, index: usize) {
        self.current = Some(index);
    }

    fn record(&self, call: String) {
        self.log.lock().unwrap().push(call);
    }

    fn detail(&self) -> Option<&Detail> {
        self.current
            .and_then(|i| self.page.listings.get(i))
            .and_then(|l| l.detail.as_ref())
    }
}

/// Selectors that identify a field of the detail view.
const FIELD_SELECTORS: [&str; 7] = [
    selectors::NAME,
    selectors::CATEGORY,
    selectors::ADDRESS,
    selectors::PHONE,
    selectors::WEBSITE,
    selectors::RATING,
    selectors::REVIEW_COUNT,
];

fn field_selector(selector: &str) -> Option<&'static str> {
    FIELD_SELECTORS.iter().copied().find(|s| *s == selector)
}

#[async_trait]
impl BrowsingSession for FakeBrowser {
    type Handle = FakeHandle;

    async fn open(&mut self, url: &str) -> Result<(), BrowserError> {
        self.record(format!("open {url}"));
        match &self.page.open_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<FakeHandle, BrowserError> {
        self.record(format!("wait {selector}"));
        let timed_out = || BrowserError::Timeout {
            selector: selector.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap(),
        };

        if selector == selectors::RESULTS_PANEL {
            if let Some(err) = &self.page.results_error {
                return Err(err.clone());
            }
            return if self.page.panel_present {
                Ok(FakeHandle::Panel)
            } else {
                Err(timed_out())
            };
        }
        if selector == selectors::DETAIL_MARKER {
            return match (self.current, self.detail()) {
                (_, Some(detail)) if detail.lost => {
                    Err(BrowserError::SessionLost("window closed".to_string()))
                }
                (Some(i), Some(_)) => Ok(FakeHandle::Field(i, selectors::DETAIL_MARKER)),
                _ => Err(timed_out()),
            };
        }
        Err(timed_out())
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<FakeHandle>, BrowserError> {
        if selector == selectors::LISTING_LINK {
            self.record(format!("find_all {selector}"));
            if let Some(err) = &self.page.results_error {
                return Err(err.clone());
            }
            return Ok((0..self.page.listings.len()).map(FakeHandle::Listing).collect());
        }
        let (Some(field), Some(index), Some(detail)) =
            (field_selector(selector), self.current, self.detail())
        else {
            return Ok(Vec::new());
        };
        let present = detail.texts.contains_key(field)
            || detail.hangs.contains(&field)
            || detail.attrs.keys().any(|(s, _)| *s == field);
        Ok(if present {
            vec![FakeHandle::Field(index, field)]
        } else {
            Vec::new()
        })
    }

    async fn scroll_to_bottom(&mut self, handle: &FakeHandle) -> Result<(), BrowserError> {
        assert_eq!(handle, &FakeHandle::Panel);
        self.record("scroll".to_string());
        match &self.page.scroll_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn click(&mut self, handle: &FakeHandle) -> Result<(), BrowserError> {
        let FakeHandle::Listing(index) = *handle else {
            return Err(BrowserError::Command("not clickable".to_string()));
        };
        self.record(format!("click {index}"));
        if let Some((at, slot)) = &self.cancel_on_click {
            if *at == index {
                if let Some(handle) = slot.get() {
                    handle.cancel();
                }
            }
        }
        if let Some(err) = &self.page.listings[index].click_error {
            return Err(err.clone());
        }
        self.current = Some(index);
        Ok(())
    }

    async fn read_text(&mut self, handle: &FakeHandle) -> Result<String, BrowserError> {
        let FakeHandle::Field(index, field) = *handle else {
            return Err(BrowserError::Command("no text".to_string()));
        };
        let detail = self.page.listings[index]
            .detail
            .clone()
            .ok_or_else(|| BrowserError::Command("stale".to_string()))?;
        if detail.hangs.contains(&field) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        detail
            .texts
            .get(field)
            .cloned()
            .ok_or_else(|| BrowserError::NotFound(field.to_string()))
    }

    async fn read_attribute(
        &mut self,
        handle: &FakeHandle,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let FakeHandle::Field(index, field) = *handle else {
            return Ok(None);
        };
        Ok(self.page.listings[index]
            .detail
            .as_ref()
            .and_then(|d| {
                d.attrs
                    .iter()
                    .find(|((s, a), _)| *s == field && *a == name)
                    .map(|(_, value)| value.clone())
            }))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.record("close".to_string());
        Ok(())
    }
}

/// Hands out one [`FakeBrowser`] per launch, all sharing one call log.
pub struct FakeLauncher {
    page: Page,
    launch_error: Option<BrowserError>,
    pub log: CallLog,
    cancel_on_click: Option<(usize, Arc<OnceLock<SessionHandle>>)>,
}

impl FakeLauncher {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            launch_error: None,
            log: CallLog::default(),
            cancel_on_click: None,
        }
    }

    pub fn failing(err: BrowserError) -> Self {
        let mut launcher = Self::new(Page::with_listings(Vec::new()));
        launcher.launch_error = Some(err);
        launcher
    }

    /// Cancel the session through `slot` when listing `index` is clicked.
    pub fn cancel_on_click(mut self, index: usize, slot: Arc<OnceLock<SessionHandle>>) -> Self {
        self.cancel_on_click = Some((index, slot));
        self
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Session = FakeBrowser;

    async fn launch(&self, headless: bool) -> Result<FakeBrowser, BrowserError> {
        self.log.lock().unwrap().push(format!("launch headless={headless}"));
        if let Some(err) = &self.launch_error {
            return Err(err.clone());
        }
        Ok(FakeBrowser {
            page: self.page.clone(),
            current: None,
            log: Arc::clone(&self.log),
            cancel_on_click: self.cancel_on_click.clone(),
        })
    }
}
