//! `BrowsingSession` over a WebDriver endpoint (chromedriver or Selenium),
//! driven through `fantoccini`.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};

use crate::{BrowserError, BrowserLauncher, BrowsingSession};

const SCROLL_SCRIPT: &str = "arguments[0].scrollTop = arguments[0].scrollHeight;";
const CLICK_SCRIPT: &str = "arguments[0].click();";

/// Opens a new WebDriver session per launch.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    webdriver_url: String,
}

impl WebDriverLauncher {
    #[must_use]
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }

    #[must_use]
    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }
}

/// Chrome capabilities: always maximized, headless on request.
fn chrome_capabilities(headless: bool) -> Map<String, Value> {
    let mut args = vec!["--start-maximized"];
    if headless {
        args.push("--headless=new");
    }
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    type Session = WebDriverSession;

    async fn launch(&self, headless: bool) -> Result<WebDriverSession, BrowserError> {
        tracing::info!(webdriver_url = %self.webdriver_url, headless, "connecting to webdriver");
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(headless))
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        Ok(WebDriverSession { client })
    }
}

/// One WebDriver browser window.
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    async fn run_script(&self, script: &str, handle: &Element) -> Result<(), BrowserError> {
        let arg = serde_json::to_value(handle).map_err(|e| BrowserError::Command(e.to_string()))?;
        self.client
            .execute(script, vec![arg])
            .await
            .map_err(|e| map_cmd_error(e, None))?;
        Ok(())
    }
}

fn map_cmd_error(err: CmdError, waited: Option<(&str, Duration)>) -> BrowserError {
    if let (CmdError::WaitTimeout, Some((selector, timeout))) = (&err, waited) {
        return BrowserError::Timeout {
            selector: selector.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };
    }
    if err.is_no_such_element() {
        return BrowserError::NotFound(err.to_string());
    }
    if matches!(err, CmdError::Lost(_)) || err.is_no_such_window() || err.is_invalid_session_id() {
        return BrowserError::SessionLost(err.to_string());
    }
    BrowserError::Command(err.to_string())
}

#[async_trait]
impl BrowsingSession for WebDriverSession {
    type Handle = Element;

    async fn open(&mut self, url: &str) -> Result<(), BrowserError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| map_cmd_error(e, None))
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, BrowserError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map_err(|e| map_cmd_error(e, Some((selector, timeout))))
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        self.client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| map_cmd_error(e, None))
    }

    async fn scroll_to_bottom(&mut self, handle: &Element) -> Result<(), BrowserError> {
        self.run_script(SCROLL_SCRIPT, handle).await
    }

    async fn click(&mut self, handle: &Element) -> Result<(), BrowserError> {
        self.run_script(CLICK_SCRIPT, handle).await
    }

    async fn read_text(&mut self, handle: &Element) -> Result<String, BrowserError> {
        handle.text().await.map_err(|e| map_cmd_error(e, None))
    }

    async fn read_attribute(
        &mut self,
        handle: &Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        handle.attr(name).await.map_err(|e| map_cmd_error(e, None))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| map_cmd_error(e, None))
    }
}

#[cfg(test)]
mod tests {
    use fantoccini::error::{ErrorStatus, WebDriver};

    use super::*;

    #[test]
    fn headed_capabilities_only_maximize() {
        let caps = chrome_capabilities(false);
        assert_eq!(caps["goog:chromeOptions"]["args"], json!(["--start-maximized"]));
        assert_eq!(caps["browserName"], json!("chrome"));
    }

    #[test]
    fn headless_capabilities_add_flag() {
        let caps = chrome_capabilities(true);
        assert_eq!(
            caps["goog:chromeOptions"]["args"],
            json!(["--start-maximized", "--headless=new"])
        );
    }

    #[test]
    fn wait_timeout_maps_to_timeout_with_selector() {
        let err = map_cmd_error(
            CmdError::WaitTimeout,
            Some(("h1.DUwDvf", Duration::from_secs(5))),
        );
        assert!(matches!(
            err,
            BrowserError::Timeout { ref selector, timeout_ms: 5000 } if selector == "h1.DUwDvf"
        ));
    }

    #[test]
    fn missing_element_maps_to_not_found() {
        let err = map_cmd_error(
            CmdError::Standard(WebDriver::new(ErrorStatus::NoSuchElement, "no such element")),
            None,
        );
        assert!(matches!(err, BrowserError::NotFound(_)));
    }

    #[test]
    fn closed_window_and_dead_session_map_to_session_lost() {
        for status in [ErrorStatus::NoSuchWindow, ErrorStatus::InvalidSessionId] {
            let err = map_cmd_error(CmdError::Standard(WebDriver::new(status, "gone")), None);
            assert!(err.is_session_lost(), "{err}");
        }
    }

    #[test]
    fn other_webdriver_errors_stay_commands() {
        let err = map_cmd_error(
            CmdError::Standard(WebDriver::new(ErrorStatus::JavascriptError, "boom")),
            None,
        );
        assert!(matches!(err, BrowserError::Command(_)));
    }
}
