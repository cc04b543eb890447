use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; unset variables fall back to defaults that
/// match the fixed timings of an interactive run.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("GMSCRAPE_LOG_LEVEL", "info");
    let webdriver_url = or_default("GMSCRAPE_WEBDRIVER_URL", "http://localhost:9515");
    let output_dir = PathBuf::from(or_default("GMSCRAPE_OUTPUT_DIR", "."));
    let search_base_url = or_default(
        "GMSCRAPE_SEARCH_BASE_URL",
        "https://www.google.com/maps/search/",
    );
    if !search_base_url.starts_with("http://") && !search_base_url.starts_with("https://") {
        return Err(ConfigError::InvalidEnvVar {
            var: "GMSCRAPE_SEARCH_BASE_URL".to_string(),
            reason: format!("'{search_base_url}' is not an http(s) URL"),
        });
    }

    let panel_timeout_secs = parse_u64("GMSCRAPE_PANEL_TIMEOUT_SECS", "10")?;
    let detail_timeout_secs = parse_u64("GMSCRAPE_DETAIL_TIMEOUT_SECS", "5")?;
    let field_timeout_secs = parse_u64("GMSCRAPE_FIELD_TIMEOUT_SECS", "2")?;
    let scroll_steps = parse_u32("GMSCRAPE_SCROLL_STEPS", "6")?;
    let scroll_delay_ms = parse_u64("GMSCRAPE_SCROLL_DELAY_MS", "2000")?;
    let search_settle_secs = parse_u64("GMSCRAPE_SEARCH_SETTLE_SECS", "2")?;

    if field_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GMSCRAPE_FIELD_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }

    Ok(AppConfig {
        log_level,
        webdriver_url,
        output_dir,
        search_base_url,
        panel_timeout_secs,
        detail_timeout_secs,
        field_timeout_secs,
        scroll_steps,
        scroll_delay_ms,
        search_settle_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
