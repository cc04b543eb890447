//! Read-only view of what earlier sessions left under an output root.

use std::fs;
use std::path::{Path, PathBuf};

use gmscrape_core::ResultRecord;

use crate::ExportError;

/// Which artifact of a flush a file is, judged by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtifactKind {
    Json,
    Csv,
    PhoneCsv,
    Report,
}

impl ArtifactKind {
    /// Classify a file name. Hidden files (including in-progress `.partial`
    /// writes) and unrelated files yield `None`.
    #[must_use]
    pub fn classify(file_name: &str) -> Option<Self> {
        if file_name.starts_with('.') {
            return None;
        }
        if file_name.starts_with("resultados_CON_TELEFONO_")
            && has_extension(file_name, "csv")
        {
            Some(Self::PhoneCsv)
        } else if file_name.starts_with("resultados_") && has_extension(file_name, "json") {
            Some(Self::Json)
        } else if file_name.starts_with("resultados_") && has_extension(file_name, "csv") {
            Some(Self::Csv)
        } else if file_name.starts_with("REPORTE_") && has_extension(file_name, "txt") {
            Some(Self::Report)
        } else {
            None
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::PhoneCsv => "phone-csv",
            Self::Report => "report",
        }
    }
}

fn has_extension(file_name: &str, ext: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

#[derive(Debug, Clone)]
pub struct ArtifactEntry {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub size_bytes: u64,
    /// For JSON dumps: the number of records, or why the file did not parse.
    pub records: Option<Result<usize, String>>,
}

#[derive(Debug, Clone)]
pub struct SessionDirectory {
    pub path: PathBuf,
    pub artifacts: Vec<ArtifactEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct OutputInventory {
    pub sessions: Vec<SessionDirectory>,
    /// Result files sitting directly in the root rather than in a session
    /// directory.
    pub loose: Vec<ArtifactEntry>,
}

impl OutputInventory {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.loose.is_empty()
    }

    /// JSON dumps anywhere in the inventory that failed to parse.
    pub fn unreadable_dumps(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.sessions
            .iter()
            .flat_map(|s| s.artifacts.iter())
            .chain(self.loose.iter())
            .filter_map(|a| match &a.records {
                Some(Err(reason)) => Some((a.path.as_path(), reason.as_str())),
                _ => None,
            })
    }
}

/// Scan `root` one level deep. Subdirectories without any recognised artifact
/// are left out. Entries are sorted by path.
///
/// # Errors
///
/// Returns [`ExportError`] if `root` or one of its subdirectories cannot be
/// listed. A missing root yields an empty inventory.
pub fn scan_output_root(root: &Path) -> Result<OutputInventory, ExportError> {
    if !root.exists() {
        return Ok(OutputInventory::default());
    }
    if !root.is_dir() {
        return Err(ExportError::NotADirectory(root.to_path_buf()));
    }

    let mut inventory = OutputInventory::default();
    for path in sorted_entries(root)? {
        if path.is_dir() {
            let artifacts = scan_artifacts(&path)?;
            if !artifacts.is_empty() {
                inventory.sessions.push(SessionDirectory { path, artifacts });
            }
        } else if let Some(entry) = artifact_entry(&path)? {
            inventory.loose.push(entry);
        }
    }

    tracing::debug!(
        root = %root.display(),
        sessions = inventory.sessions.len(),
        loose = inventory.loose.len(),
        "output root scanned"
    );
    Ok(inventory)
}

/// Read back a JSON dump written by a flush.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be read or is not a JSON array
/// of records.
pub fn load_records(path: &Path) -> Result<Vec<ResultRecord>, ExportError> {
    let raw = fs::read(path).map_err(|e| ExportError::io(path, e))?;
    serde_json::from_slice(&raw).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ExportError::io(dir, e))? {
        let entry = entry.map_err(|e| ExportError::io(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn scan_artifacts(dir: &Path) -> Result<Vec<ArtifactEntry>, ExportError> {
    let mut artifacts = Vec::new();
    for path in sorted_entries(dir)? {
        if path.is_file() {
            if let Some(entry) = artifact_entry(&path)? {
                artifacts.push(entry);
            }
        }
    }
    Ok(artifacts)
}

fn artifact_entry(path: &Path) -> Result<Option<ArtifactEntry>, ExportError> {
    let Some(kind) = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(ArtifactKind::classify)
    else {
        return Ok(None);
    };

    let size_bytes = fs::metadata(path)
        .map_err(|e| ExportError::io(path, e))?
        .len();
    let records = (kind == ArtifactKind::Json).then(|| match load_records(path) {
        Ok(records) => Ok(records.len()),
        Err(e) => Err(e.to_string()),
    });

    Ok(Some(ArtifactEntry {
        path: path.to_path_buf(),
        kind,
        size_bytes,
        records,
    }))
}
