pub mod app_config;
pub mod config;
pub mod record;
pub mod scrape_config;
pub mod searches;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use record::{FieldValue, ResultRecord, COLUMNS, UNAVAILABLE};
pub use scrape_config::ScrapeConfig;
pub use searches::{load_searches, SearchEntry, SearchesFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read searches file {path}: {source}")]
    SearchesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse searches file: {0}")]
    SearchesFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
