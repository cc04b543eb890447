//! Durable multi-format output for completed scrape sessions.
//!
//! A flush writes one session directory (named after the query and location)
//! containing a JSON dump, a full CSV export, a phone-only CSV export and a
//! plain-text report, all sharing one timestamp token.

pub mod error;
pub mod inventory;
pub mod report;
pub mod sanitize;
pub mod tabular;
pub mod writer;

pub use error::ExportError;
pub use inventory::{
    load_records, scan_output_root, ArtifactEntry, ArtifactKind, OutputInventory, SessionDirectory,
};
pub use sanitize::session_dir_name;
pub use writer::{OutputWriter, SessionOutputBundle};
