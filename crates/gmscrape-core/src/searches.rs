//! Batch search file: a YAML list of query/location pairs run one after
//! another by the CLI `batch` command.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::{ConfigError, ScrapeConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct SearchEntry {
    pub query: String,
    pub location: String,
    pub max_results: Option<usize>,
    pub wait_secs: Option<u64>,
    pub headless: Option<bool>,
}

impl SearchEntry {
    /// Convert to a session config. `default_headless` applies when the entry
    /// does not set `headless` itself.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for blank query/location or a zero
    /// result cap.
    pub fn to_scrape_config(&self, default_headless: bool) -> Result<ScrapeConfig, ConfigError> {
        let mut config = ScrapeConfig::new(&self.query, &self.location)?
            .with_headless(self.headless.unwrap_or(default_headless));
        if let Some(max_results) = self.max_results {
            config = config.with_max_results(max_results)?;
        }
        if let Some(wait_secs) = self.wait_secs {
            config = config.with_per_item_wait_secs(wait_secs);
        }
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchesFile {
    pub searches: Vec<SearchEntry>,
}

/// Load and validate a batch search file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_searches(path: &Path) -> Result<SearchesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SearchesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let searches_file: SearchesFile = serde_yaml::from_str(&content)?;

    validate_searches(&searches_file)?;

    Ok(searches_file)
}

fn validate_searches(searches_file: &SearchesFile) -> Result<(), ConfigError> {
    if searches_file.searches.is_empty() {
        return Err(ConfigError::Validation(
            "searches file lists no searches".to_string(),
        ));
    }

    let mut seen = HashSet::new();

    for entry in &searches_file.searches {
        if entry.query.trim().is_empty() || entry.location.trim().is_empty() {
            return Err(ConfigError::Validation(
                "every search needs a non-empty query and location".to_string(),
            ));
        }

        if entry.max_results == Some(0) {
            return Err(ConfigError::Validation(format!(
                "search '{}' in '{}' has max_results 0; must be at least 1",
                entry.query, entry.location
            )));
        }

        let key = (
            entry.query.trim().to_lowercase(),
            entry.location.trim().to_lowercase(),
        );
        if !seen.insert(key) {
            return Err(ConfigError::Validation(format!(
                "duplicate search: '{}' in '{}'",
                entry.query, entry.location
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "searches_test.rs"]
mod tests;
