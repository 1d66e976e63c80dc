//! CSV and JSON Lines output.

use crate::error::{ExportError, Result};
use crate::projection::Projection;
use harvest_core::ExportFormat;
use serde_json::Value;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `projection` to `path` in `format`, replacing any existing file.
///
/// Missing parent directories are created. Returns the number of rows
/// written.
pub fn write_projection(
    path: &Path,
    format: ExportFormat,
    projection: &Projection,
) -> Result<usize> {
    match format {
        ExportFormat::Csv => write_csv(path, projection),
        ExportFormat::JsonLines => write_json_lines(path, projection),
    }
}

/// Write a header row of the projected columns, then one record per row.
///
/// `null` becomes an empty cell, strings are written raw, other values as
/// JSON text. A projection without columns produces an empty file.
pub fn write_csv(path: &Path, projection: &Projection) -> Result<usize> {
    let file = create(path)?;
    let csv_error = |source: csv::Error| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_writer(file);
    let rows = if projection.columns().is_empty() {
        0
    } else {
        writer
            .write_record(projection.columns())
            .map_err(csv_error)?;
        for row in projection.rows() {
            writer
                .write_record(projection.columns().iter().map(|column| {
                    cell(row.get(column).unwrap_or(&Value::Null)).into_owned()
                }))
                .map_err(csv_error)?;
        }
        projection.len()
    };
    writer.flush().map_err(|source| io_error(path, source))?;

    log_written(path, "csv", rows, projection.columns().len());
    Ok(rows)
}

/// Write one JSON object per row.
pub fn write_json_lines(path: &Path, projection: &Projection) -> Result<usize> {
    let mut writer = create(path)?;
    for (row, fields) in projection.rows().iter().enumerate() {
        serde_json::to_writer(&mut writer, fields).map_err(|source| {
            if source.is_io() {
                io_error(path, source.into())
            } else {
                ExportError::Serialization { row, source }
            }
        })?;
        writer
            .write_all(b"\n")
            .map_err(|source| io_error(path, source))?;
    }
    writer.flush().map_err(|source| io_error(path, source))?;

    log_written(path, "json_lines", projection.len(), projection.columns().len());
    Ok(projection.len())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_error(path, source))?;
    }
    let file = File::create(path).map_err(|source| io_error(path, source))?;
    Ok(BufWriter::new(file))
}

fn io_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn cell(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

fn log_written(path: &Path, format: &str, rows: usize, columns: usize) {
    tracing::info!(path = %path.display(), format, rows, columns, "wrote export");
}
