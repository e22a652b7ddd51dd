//! Append-only master dataset writer.
//!
//! The master file accumulates every processed period. A missing file is
//! created with a header; an existing file only ever grows by whole-row
//! appends, with prior contents untouched byte for byte. Single-writer
//! discipline is assumed: the existence check and the append are not atomic
//! together.

use std::io::Write;
use std::path::Path;

use tracing::info;
use unload_core::error::{Result, UnloadError};
use unload_core::models::EncodedRow;

/// Column header written when the master file is first created.
pub const MASTER_HEADER: [&str; 10] = [
    "period",
    "direction",
    "country",
    "country_group",
    "branch",
    "classification_code",
    "value",
    "net_weight",
    "quantity",
    "granularity_depth",
];

/// Append `rows` to the master file at `path`, creating it when absent.
///
/// Creation serializes header and rows to a temporary file in the target
/// directory and renames it into place. Appends serialize to one in-memory
/// buffer and issue a single write, so a failure cannot leave a torn row in
/// the middle of previously stored data.
///
/// Returns the number of rows written.
pub fn append_to_master(path: &Path, rows: &[EncodedRow]) -> Result<usize> {
    if path.exists() {
        let buf = serialize_rows(rows, false)?;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|source| UnloadError::StoreWrite {
                path: path.to_path_buf(),
                source,
            })?;
        file.write_all(&buf)
            .and_then(|()| file.flush())
            .map_err(|source| UnloadError::StoreWrite {
                path: path.to_path_buf(),
                source,
            })?;
        info!("Appended {} rows to {}", rows.len(), path.display());
    } else {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let buf = serialize_rows(rows, true)?;
        let tmp = path.with_extension("csv.tmp");
        std::fs::write(&tmp, &buf).map_err(|source| UnloadError::StoreWrite {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, path).map_err(|source| UnloadError::StoreWrite {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Created {} with {} rows", path.display(), rows.len());
    }

    Ok(rows.len())
}

/// Serialize rows (optionally preceded by the header) into CSV bytes.
fn serialize_rows(rows: &[EncodedRow], with_header: bool) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buf);

        if with_header {
            wtr.write_record(MASTER_HEADER)?;
        }

        for row in rows {
            wtr.write_record([
                row.period.to_string(),
                row.direction.to_string(),
                row.country.to_string(),
                row.country_group
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                row.branch
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                row.classification_code.clone(),
                row.measures.value.to_string(),
                row.measures.net_weight.to_string(),
                row.measures.quantity.to_string(),
                row.granularity_depth.to_string(),
            ])?;
        }

        wtr.flush()?;
    }
    Ok(buf)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
