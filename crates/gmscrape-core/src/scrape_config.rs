use crate::ConfigError;

/// Parameters of one scrape session. Immutable once built; construction
/// rejects blank query/location and a zero result cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    query: String,
    location: String,
    max_results: usize,
    per_item_wait_secs: u64,
    headless: bool,
}

impl ScrapeConfig {
    pub const DEFAULT_MAX_RESULTS: usize = 25;
    pub const DEFAULT_PER_ITEM_WAIT_SECS: u64 = 3;

    /// Create a config with default cap, wait and a visible browser.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `query` or `location` is blank.
    pub fn new(query: &str, location: &str) -> Result<Self, ConfigError> {
        let query = query.trim();
        let location = location.trim();
        if query.is_empty() {
            return Err(ConfigError::Validation(
                "search query must be non-empty".to_string(),
            ));
        }
        if location.is_empty() {
            return Err(ConfigError::Validation(
                "search location must be non-empty".to_string(),
            ));
        }

        Ok(Self {
            query: query.to_string(),
            location: location.to_string(),
            max_results: Self::DEFAULT_MAX_RESULTS,
            per_item_wait_secs: Self::DEFAULT_PER_ITEM_WAIT_SECS,
            headless: false,
        })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `max_results` is zero.
    pub fn with_max_results(mut self, max_results: usize) -> Result<Self, ConfigError> {
        if max_results == 0 {
            return Err(ConfigError::Validation(
                "max results must be at least 1".to_string(),
            ));
        }
        self.max_results = max_results;
        Ok(self)
    }

    #[must_use]
    pub fn with_per_item_wait_secs(mut self, secs: u64) -> Self {
        self.per_item_wait_secs = secs;
        self
    }

    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    #[must_use]
    pub fn per_item_wait_secs(&self) -> u64 {
        self.per_item_wait_secs
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Free-text search terms: `"{query} {location}"`.
    #[must_use]
    pub fn search_terms(&self) -> String {
        format!("{} {}", self.query, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form_defaults() {
        let cfg = ScrapeConfig::new("escuelas primarias", "Córdoba, Argentina").unwrap();
        assert_eq!(cfg.max_results(), 25);
        assert_eq!(cfg.per_item_wait_secs(), 3);
        assert!(!cfg.headless());
    }

    #[test]
    fn trims_query_and_location() {
        let cfg = ScrapeConfig::new("  farmacias ", " Rosario ").unwrap();
        assert_eq!(cfg.query(), "farmacias");
        assert_eq!(cfg.location(), "Rosario");
        assert_eq!(cfg.search_terms(), "farmacias Rosario");
    }

    #[test]
    fn rejects_blank_query() {
        let err = ScrapeConfig::new("   ", "Rosario").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("query")));
    }

    #[test]
    fn rejects_blank_location() {
        let err = ScrapeConfig::new("farmacias", "").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("location")));
    }

    #[test]
    fn rejects_zero_max_results() {
        let result = ScrapeConfig::new("farmacias", "Rosario")
            .unwrap()
            .with_max_results(0);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn builder_overrides_apply() {
        let cfg = ScrapeConfig::new("farmacias", "Rosario")
            .unwrap()
            .with_max_results(3)
            .unwrap()
            .with_per_item_wait_secs(0)
            .with_headless(true);
        assert_eq!(cfg.max_results(), 3);
        assert_eq!(cfg.per_item_wait_secs(), 0);
        assert!(cfg.headless());
    }
}
