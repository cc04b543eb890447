//! `verify` command: report what earlier sessions wrote.

use std::path::Path;
use std::process::ExitCode;

use gmscrape_export::{scan_output_root, ArtifactEntry};

pub(crate) fn run_verify(root: &Path) -> anyhow::Result<ExitCode> {
    let inventory = scan_output_root(root)?;
    if inventory.is_empty() {
        println!("no session output under {}", root.display());
        return Ok(ExitCode::SUCCESS);
    }

    for session in &inventory.sessions {
        let name = session
            .path
            .file_name()
            .map_or_else(|| session.path.display().to_string(), |n| n.to_string_lossy().into_owned());
        println!("{name}/");
        for artifact in &session.artifacts {
            println!("  {}", artifact_line(artifact));
        }
    }
    if !inventory.loose.is_empty() {
        println!("loose files in {}:", root.display());
        for artifact in &inventory.loose {
            println!("  {}", artifact_line(artifact));
        }
    }

    let unreadable: Vec<_> = inventory.unreadable_dumps().collect();
    for (path, reason) in &unreadable {
        eprintln!("unreadable dump {}: {reason}", path.display());
    }
    Ok(if unreadable.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub(crate) fn artifact_line(artifact: &ArtifactEntry) -> String {
    let name = artifact
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut line = format!(
        "{name} [{}] {} bytes",
        artifact.kind.label(),
        artifact.size_bytes
    );
    match &artifact.records {
        Some(Ok(count)) => line.push_str(&format!(", {count} records")),
        Some(Err(_)) => line.push_str(", unreadable"),
        None => {}
    }
    line
}
