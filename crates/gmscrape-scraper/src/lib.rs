//! Browser-driven extraction of business listings.
//!
//! A [`ScrapeSession`] drives one search through a [`BrowsingSession`]
//! capability: enumerate candidate listings, open each one, extract its
//! fields, and hand the accumulated records to the output writer.

pub mod browser;
pub mod enumerate;
pub mod error;
pub mod events;
pub mod extract;
pub mod selectors;
pub mod session;
pub mod webdriver;

pub use browser::{BrowserLauncher, BrowsingSession};
pub use enumerate::{Candidates, ListingEnumerator};
pub use error::BrowserError;
pub use events::{NullSink, ProgressSink, ScrapeEvent};
pub use extract::FieldExtractor;
pub use session::{
    search_url, CancelToken, ItemOutcome, ScrapeSession, SessionHandle, SessionReport,
    SessionSettings, SessionState,
};
pub use webdriver::{WebDriverLauncher, WebDriverSession};
