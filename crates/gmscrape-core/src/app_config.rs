use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub webdriver_url: String,
    pub output_dir: PathBuf,
    pub search_base_url: String,
    pub panel_timeout_secs: u64,
    pub detail_timeout_secs: u64,
    pub field_timeout_secs: u64,
    pub scroll_steps: u32,
    pub scroll_delay_ms: u64,
    pub search_settle_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("webdriver_url", &redact_userinfo(&self.webdriver_url))
            .field("output_dir", &self.output_dir)
            .field("search_base_url", &self.search_base_url)
            .field("panel_timeout_secs", &self.panel_timeout_secs)
            .field("detail_timeout_secs", &self.detail_timeout_secs)
            .field("field_timeout_secs", &self.field_timeout_secs)
            .field("scroll_steps", &self.scroll_steps)
            .field("scroll_delay_ms", &self.scroll_delay_ms)
            .field("search_settle_secs", &self.search_settle_secs)
            .finish()
    }
}

/// Hide `user:password@` credentials embedded in a grid URL.
fn redact_userinfo(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}[redacted]{}", &url[..scheme_end + 3], &rest[at..]),
        None => url.to_string(),
    }
}
