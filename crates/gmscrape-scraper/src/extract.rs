//! Per-field extraction from an opened detail view.

use std::time::Duration;

use gmscrape_core::{FieldValue, ResultRecord};

use crate::selectors;
use crate::BrowsingSession;

/// Reads the seven fields of a listing from the current detail view.
///
/// Every lookup is bounded by `lookup_timeout`. A lookup that fails for any
/// reason (no match, timeout, stale handle) yields the sentinel for that field
/// and extraction moves on; [`FieldExtractor::extract`] therefore always
/// returns a fully populated record.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor {
    lookup_timeout: Duration,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl FieldExtractor {
    #[must_use]
    pub fn new(lookup_timeout: Duration) -> Self {
        Self { lookup_timeout }
    }

    pub async fn extract<B: BrowsingSession>(&self, browser: &mut B) -> ResultRecord {
        let name = self.text_of(browser, selectors::NAME).await;
        let category = self.text_of(browser, selectors::CATEGORY).await;
        let address = self.text_of(browser, selectors::ADDRESS).await;
        let phone = self.phone(browser).await;
        let website = self
            .attribute_of(browser, selectors::WEBSITE, selectors::WEBSITE_ATTRIBUTE)
            .await;
        let rating = self.text_of(browser, selectors::RATING).await;
        let review_count = self.text_of(browser, selectors::REVIEW_COUNT).await;

        ResultRecord {
            name,
            category,
            address,
            phone,
            website,
            rating,
            review_count,
        }
    }

    async fn text_of<B: BrowsingSession>(&self, browser: &mut B, selector: &str) -> FieldValue {
        let lookup = async {
            let handle = first_match(browser, selector).await?;
            browser.read_text(&handle).await.ok()
        };
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Some(text)) => FieldValue::from_text(&text),
            Ok(None) => FieldValue::Unavailable,
            Err(_) => {
                tracing::debug!(selector, "field lookup timed out");
                FieldValue::Unavailable
            }
        }
    }

    async fn attribute_of<B: BrowsingSession>(
        &self,
        browser: &mut B,
        selector: &str,
        attribute: &str,
    ) -> FieldValue {
        let lookup = async {
            let handle = first_match(browser, selector).await?;
            browser.read_attribute(&handle, attribute).await.ok().flatten()
        };
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Some(value)) => FieldValue::from_text(&value),
            Ok(None) => FieldValue::Unavailable,
            Err(_) => {
                tracing::debug!(selector, attribute, "field lookup timed out");
                FieldValue::Unavailable
            }
        }
    }

    /// Structured attribute first, visible text second.
    async fn phone<B: BrowsingSession>(&self, browser: &mut B) -> FieldValue {
        let lookup = async {
            let handle = first_match(browser, selectors::PHONE).await?;
            let structured = browser
                .read_attribute(&handle, selectors::PHONE_ATTRIBUTE)
                .await
                .ok()
                .flatten()
                .map(|raw| phone_from_attribute(&raw))
                .unwrap_or_default();
            if structured.is_present() {
                return Some(structured);
            }
            let text = browser.read_text(&handle).await.ok()?;
            Some(FieldValue::from_text(&text))
        };
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Some(value)) => value,
            Ok(None) => FieldValue::Unavailable,
            Err(_) => {
                tracing::debug!("phone lookup timed out");
                FieldValue::Unavailable
            }
        }
    }
}

async fn first_match<B: BrowsingSession>(browser: &mut B, selector: &str) -> Option<B::Handle> {
    browser.find_all(selector).await.ok()?.into_iter().next()
}

/// Number carried by a phone button's `data-item-id`, e.g.
/// `phone:tel:03514220000` becomes `03514220000`.
fn phone_from_attribute(raw: &str) -> FieldValue {
    let number = raw
        .trim()
        .strip_prefix(selectors::PHONE_ATTRIBUTE_PREFIX)
        .unwrap_or(raw.trim());
    FieldValue::from_text(number)
}
