//! Session flush: writes the four artifacts of one session into its directory.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use gmscrape_core::{ResultRecord, ScrapeConfig};

use crate::report::render_report;
use crate::sanitize::session_dir_name;
use crate::tabular::write_records;
use crate::ExportError;

/// Format of the timestamp token shared by the files of one flush.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Upper bound on `_N` suffixes tried when a token is already taken.
const MAX_TOKEN_SUFFIX: u32 = 1000;

/// Paths and counts produced by one flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutputBundle {
    pub directory: PathBuf,
    pub token: String,
    pub json: PathBuf,
    pub csv: PathBuf,
    /// Only written when at least one record has a phone.
    pub phone_csv: Option<PathBuf>,
    pub report: PathBuf,
    pub total: usize,
    pub with_phone: usize,
}

/// Writes session artifacts under a root directory. Holds no session state.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the given session flushes into.
    #[must_use]
    pub fn session_dir(&self, config: &ScrapeConfig) -> PathBuf {
        self.root
            .join(session_dir_name(config.query(), config.location()))
    }

    /// Flush `records` using the current local time as the token.
    ///
    /// # Errors
    ///
    /// See [`OutputWriter::flush_at`].
    pub fn flush(
        &self,
        records: &[ResultRecord],
        config: &ScrapeConfig,
    ) -> Result<SessionOutputBundle, ExportError> {
        self.flush_at(records, config, Local::now())
    }

    /// Flush `records` into the session directory, creating it if absent.
    ///
    /// The directory is reused as-is when it already exists. Files from earlier
    /// flushes are never overwritten: if the token derived from `now` is taken,
    /// a `_2`, `_3`, ... suffix is appended.
    ///
    /// Artifacts are written one at a time; a failure part-way leaves the
    /// already-written artifacts in place.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the directory cannot be created or any
    /// artifact cannot be written.
    pub fn flush_at(
        &self,
        records: &[ResultRecord],
        config: &ScrapeConfig,
        now: DateTime<Local>,
    ) -> Result<SessionOutputBundle, ExportError> {
        let directory = self.session_dir(config);
        ensure_directory(&directory)?;

        let base_token = now.format(TIMESTAMP_FORMAT).to_string();
        let token = free_token(&directory, &base_token)?;
        let names = ArtifactNames::new(&directory, &token);

        let with_phone: Vec<&ResultRecord> = records.iter().filter(|r| r.has_phone()).collect();
        let all: Vec<&ResultRecord> = records.iter().collect();

        write_atomic(&names.json, |out| {
            serde_json::to_writer_pretty(&mut *out, records).map_err(|source| {
                ExportError::Json {
                    path: names.json.clone(),
                    source,
                }
            })?;
            out.write_all(b"\n")
                .map_err(|e| ExportError::io(&names.json, e))
        })?;

        write_atomic(&names.csv, |out| write_records(out, &all, &names.csv))?;

        let phone_csv = if with_phone.is_empty() {
            None
        } else {
            write_atomic(&names.phone_csv, |out| {
                write_records(out, &with_phone, &names.phone_csv)
            })?;
            Some(names.phone_csv.clone())
        };

        let report = render_report(config.query(), config.location(), now, records);
        write_atomic(&names.report, |out| {
            out.write_all(report.as_bytes())
                .map_err(|e| ExportError::io(&names.report, e))
        })?;

        tracing::info!(
            directory = %directory.display(),
            token = %token,
            total = records.len(),
            with_phone = with_phone.len(),
            "session output flushed"
        );

        Ok(SessionOutputBundle {
            directory,
            token,
            json: names.json,
            csv: names.csv,
            phone_csv,
            report: names.report,
            total: records.len(),
            with_phone: with_phone.len(),
        })
    }
}

struct ArtifactNames {
    json: PathBuf,
    csv: PathBuf,
    phone_csv: PathBuf,
    report: PathBuf,
}

impl ArtifactNames {
    fn new(directory: &Path, token: &str) -> Self {
        Self {
            json: directory.join(format!("resultados_{token}.json")),
            csv: directory.join(format!("resultados_{token}.csv")),
            phone_csv: directory.join(format!("resultados_CON_TELEFONO_{token}.csv")),
            report: directory.join(format!("REPORTE_{token}.txt")),
        }
    }

    fn any_exists(&self) -> bool {
        [&self.json, &self.csv, &self.phone_csv, &self.report]
            .iter()
            .any(|p| p.exists())
    }
}

/// First token (`base`, `base_2`, `base_3`, ...) none of whose artifact names
/// exist yet in `directory`.
fn free_token(directory: &Path, base: &str) -> Result<String, ExportError> {
    if !ArtifactNames::new(directory, base).any_exists() {
        return Ok(base.to_string());
    }
    for n in 2..=MAX_TOKEN_SUFFIX {
        let candidate = format!("{base}_{n}");
        if !ArtifactNames::new(directory, &candidate).any_exists() {
            return Ok(candidate);
        }
    }
    Err(ExportError::io(
        directory,
        std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("no free file name for token {base}"),
        ),
    ))
}

pub(crate) fn ensure_directory(dir: &Path) -> Result<(), ExportError> {
    if dir.exists() && !dir.is_dir() {
        return Err(ExportError::NotADirectory(dir.to_path_buf()));
    }
    fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))
}

/// Write through a hidden `.partial` sibling and rename it into place, so the
/// final name only ever refers to a complete file.
fn write_atomic<F>(path: &Path, fill: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), ExportError>,
{
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = path.with_file_name(format!(".{file_name}.partial"));

    let result = (|| {
        let file = File::create(&partial).map_err(|e| ExportError::io(&partial, e))?;
        let mut out = BufWriter::new(file);
        fill(&mut out)?;
        out.flush().map_err(|e| ExportError::io(&partial, e))?;
        out.get_ref()
            .sync_all()
            .map_err(|e| ExportError::io(&partial, e))?;
        fs::rename(&partial, path).map_err(|e| ExportError::io(path, e))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}
