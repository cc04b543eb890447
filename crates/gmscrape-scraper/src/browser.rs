//! The browsing capability consumed by the session engine.
//!
//! The engine never speaks an automation protocol directly; it drives one
//! stateful page through [`BrowsingSession`] and acquires it through a
//! [`BrowserLauncher`]. The production implementation lives in
//! [`crate::webdriver`].

use std::time::Duration;

use async_trait::async_trait;

use crate::BrowserError;

/// One browser page, exclusively owned by a single session.
///
/// Every operation may fail. Element handles are only meaningful for the
/// session that produced them and may go stale after navigation.
#[async_trait]
pub trait BrowsingSession: Send {
    type Handle: Clone + Send + Sync + 'static;

    async fn open(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Wait until an element matching `selector` is present, up to `timeout`.
    ///
    /// Returns [`BrowserError::Timeout`] when the element never appears.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Handle, BrowserError>;

    /// All elements currently matching `selector`, in document order.
    async fn find_all(&mut self, selector: &str) -> Result<Vec<Self::Handle>, BrowserError>;

    async fn scroll_to_bottom(&mut self, handle: &Self::Handle) -> Result<(), BrowserError>;

    async fn click(&mut self, handle: &Self::Handle) -> Result<(), BrowserError>;

    async fn read_text(&mut self, handle: &Self::Handle) -> Result<String, BrowserError>;

    async fn read_attribute(
        &mut self,
        handle: &Self::Handle,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    /// Release the page. Called exactly once, on every exit path.
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Acquires a fresh [`BrowsingSession`].
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowsingSession + 'static;

    /// # Errors
    ///
    /// Returns [`BrowserError::Launch`] when no browser can be acquired.
    async fn launch(&self, headless: bool) -> Result<Self::Session, BrowserError>;
}
