//! `scrape` and `batch` command handlers.
//!
//! The session runs on its own tokio task. This task only drains the event
//! channel, prints progress and turns Ctrl-C into a cancellation request.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use gmscrape_core::{AppConfig, ScrapeConfig};
use gmscrape_export::OutputWriter;
use gmscrape_scraper::{
    ScrapeSession, SessionReport, SessionSettings, SessionState, WebDriverLauncher,
};
use tokio::sync::mpsc;

use crate::progress::describe;
use crate::TargetArgs;

/// Output root and WebDriver endpoint after applying CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub output_dir: PathBuf,
    pub webdriver_url: String,
}

impl Target {
    pub(crate) fn resolve(config: &AppConfig, args: &TargetArgs) -> Self {
        Self {
            output_dir: args
                .output_dir
                .clone()
                .unwrap_or_else(|| config.output_dir.clone()),
            webdriver_url: args
                .webdriver_url
                .clone()
                .unwrap_or_else(|| config.webdriver_url.clone()),
        }
    }
}

pub(crate) fn any_failed(states: &[SessionState]) -> bool {
    states.contains(&SessionState::Failed)
}

/// Non-zero when any session failed.
pub(crate) fn exit_code(states: &[SessionState]) -> ExitCode {
    if any_failed(states) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Run one session to completion, printing its events as they arrive.
///
/// # Errors
///
/// Returns an error only if the session task itself panics; session failures
/// are reported through the returned [`SessionReport`].
pub(crate) async fn run_scrape(
    config: &AppConfig,
    target: &Target,
    scrape_config: ScrapeConfig,
) -> anyhow::Result<SessionReport> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = ScrapeSession::new(
        scrape_config,
        WebDriverLauncher::new(target.webdriver_url.clone()),
        OutputWriter::new(target.output_dir.clone()),
    )
    .with_settings(SessionSettings::from_app_config(config))
    .with_sink(Arc::new(tx));
    let handle = session.handle();

    let worker = tokio::spawn(session.run());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut cancel_requested = false;
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => {
                    if let Some(line) = describe(&event) {
                        println!("{line}");
                    }
                }
                None => break,
            },
            signal = &mut ctrl_c, if !cancel_requested => {
                cancel_requested = true;
                match signal {
                    Ok(()) => {
                        handle.cancel();
                        println!("cancelling after the current listing...");
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to listen for ctrl-c"),
                }
            }
        }
    }

    let report = worker.await?;
    tracing::info!(
        state = %report.state,
        records = report.records.len(),
        skipped = report.skipped,
        "session report"
    );
    Ok(report)
}

/// Run every search in `file` sequentially. Stops early if a session is
/// cancelled.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or an entry is invalid.
pub(crate) async fn run_batch(
    config: &AppConfig,
    target: &Target,
    file: &Path,
    default_headless: bool,
) -> anyhow::Result<Vec<SessionState>> {
    let searches = gmscrape_core::load_searches(file)?;
    let configs = searches
        .searches
        .iter()
        .map(|entry| entry.to_scrape_config(default_headless))
        .collect::<Result<Vec<_>, _>>()?;

    let total = configs.len();
    let mut states = Vec::with_capacity(total);
    for (i, scrape_config) in configs.into_iter().enumerate() {
        println!("== search {}/{total} ==", i + 1);
        let report = run_scrape(config, target, scrape_config).await?;
        states.push(report.state);
        if report.state == SessionState::Cancelled {
            println!("batch stopped after cancellation");
            break;
        }
    }

    let failed = states.iter().filter(|s| **s == SessionState::Failed).count();
    println!(
        "batch finished: {} of {total} searches run, {failed} failed",
        states.len()
    );
    Ok(states)
}
