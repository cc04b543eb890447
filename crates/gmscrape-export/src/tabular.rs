//! CSV exports of result records.

use std::io::Write;
use std::path::Path;

use gmscrape_core::ResultRecord;

use crate::ExportError;

/// Write `records` as CSV to `out`: one header row in column order, then one
/// row per record. The header is written even when `records` is empty.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] (tagged with `path`) if serialization or the
/// underlying writer fails.
pub fn write_records<W: Write>(
    out: W,
    records: &[&ResultRecord],
    path: &Path,
) -> Result<(), ExportError> {
    let to_export_error = |source: csv::Error| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    writer
        .write_record(gmscrape_core::COLUMNS)
        .map_err(to_export_error)?;
    for record in records {
        writer
            .write_record(record.fields().iter().map(|f| f.as_str()))
            .map_err(to_export_error)?;
    }
    writer
        .flush()
        .map_err(|e| ExportError::io(path, e))?;
    Ok(())
}
