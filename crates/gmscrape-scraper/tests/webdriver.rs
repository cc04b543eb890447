//! `WebDriverLauncher` against a mocked WebDriver endpoint.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gmscrape_scraper::{BrowserError, BrowserLauncher, WebDriverLauncher};

async fn refusing_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": {
                "error": "session not created",
                "message": "Chrome failed to start: exited abnormally",
                "stacktrace": ""
            }
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn session_creation_failure_maps_to_launch_error() {
    let server = refusing_server().await;
    let launcher = WebDriverLauncher::new(server.uri());

    let result = launcher.launch(true).await;

    assert!(
        matches!(result, Err(BrowserError::Launch(_))),
        "expected launch error"
    );
}

#[tokio::test]
async fn headless_launch_requests_headless_chrome() {
    let server = refusing_server().await;
    let launcher = WebDriverLauncher::new(server.uri());

    let _ = launcher.launch(true).await;

    let requests = server.received_requests().await.unwrap();
    let first = requests.first().expect("session request sent");
    let body = String::from_utf8_lossy(&first.body);
    assert!(body.contains("--headless=new"), "{body}");
    assert!(body.contains("--start-maximized"), "{body}");
}

#[tokio::test]
async fn headed_launch_omits_headless_flag() {
    let server = refusing_server().await;
    let launcher = WebDriverLauncher::new(server.uri());

    let _ = launcher.launch(false).await;

    let requests = server.received_requests().await.unwrap();
    let first = requests.first().expect("session request sent");
    let body = String::from_utf8_lossy(&first.body);
    assert!(!body.contains("--headless"), "{body}");
}
