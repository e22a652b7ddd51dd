//! Artifact extraction boundary.
//!
//! The export agent deposits its output as a fixed-name tabular artifact in
//! the drop directory. This module reads that artifact into raw rows and
//! archives the consumed file under a period-stamped name, so a later run
//! never mistakes a stale artifact for its own export.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use unload_core::error::{Result, UnloadError};
use unload_core::models::RawStatRow;
use unload_core::period::Period;

/// Read all raw rows from the artifact at `path`.
///
/// The artifact is a headered delimited-text table; every field is kept as
/// text and coerced downstream by the normalizer.
pub fn read_artifact_rows(path: &Path) -> Result<Vec<RawStatRow>> {
    let file = std::fs::File::open(path).map_err(|source| UnloadError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut rows: Vec<RawStatRow> = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }

    debug!("Read {} raw rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Move the consumed artifact into `storage_dir` as `TSVTdata_{key}.csv`.
///
/// Falls back to copy-and-remove when the rename crosses filesystems.
/// Returns the archived path.
pub fn archive_artifact(artifact: &Path, storage_dir: &Path, period: &Period) -> Result<PathBuf> {
    std::fs::create_dir_all(storage_dir)?;
    let dest = storage_dir.join(format!("TSVTdata_{}.csv", period.key()));

    if std::fs::rename(artifact, &dest).is_err() {
        std::fs::copy(artifact, &dest).map_err(|source| UnloadError::FileRead {
            path: artifact.to_path_buf(),
            source,
        })?;
        std::fs::remove_file(artifact)?;
    }

    info!("Archived artifact to {}", dest.display());
    Ok(dest)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "period,napr,strana,tnved,Stoim,Netto,Kol";

    fn write_artifact(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    // ── read_artifact_rows ────────────────────────────────────────────────────

    #[test]
    fn test_read_artifact_rows_basic() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(
            tmp.path(),
            "DATTSVT.csv",
            &["202401,ИМ,643,0101210009,\"1,5\",\"2,0\",3"],
        );

        let rows = read_artifact_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].period, "202401");
        assert_eq!(rows[0].direction, "ИМ");
        assert_eq!(rows[0].country, "643");
        assert_eq!(rows[0].classification_code, "0101210009");
        assert_eq!(rows[0].value, "1,5");
        assert_eq!(rows[0].net_weight, "2,0");
        assert_eq!(rows[0].quantity, "3");
    }

    #[test]
    fn test_read_artifact_rows_missing_file() {
        let err = read_artifact_rows(Path::new("/tmp/no-such-artifact.csv")).unwrap_err();
        assert!(matches!(err, UnloadError::FileRead { .. }));
    }

    #[test]
    fn test_read_artifact_rows_empty_table() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(tmp.path(), "DATTSVT.csv", &[]);

        let rows = read_artifact_rows(&path).unwrap();
        assert!(rows.is_empty());
    }

    // ── archive_artifact ──────────────────────────────────────────────────────

    #[test]
    fn test_archive_artifact_moves_file() {
        let tmp = TempDir::new().unwrap();
        let drop_dir = tmp.path().join("drop");
        let storage = tmp.path().join("storage");
        std::fs::create_dir_all(&drop_dir).unwrap();
        let artifact = write_artifact(&drop_dir, "DATTSVT.csv", &["202401,ИМ,643,0101210009,1,2,3"]);

        let period = Period::new(1, 2024).unwrap();
        let archived = archive_artifact(&artifact, &storage, &period).unwrap();

        assert_eq!(archived, storage.join("TSVTdata_12024.csv"));
        assert!(archived.exists(), "archived copy must exist");
        assert!(!artifact.exists(), "drop-dir artifact must be gone");
    }

    #[test]
    fn test_archive_artifact_content_preserved() {
        let tmp = TempDir::new().unwrap();
        let storage = tmp.path().join("storage");
        let artifact = write_artifact(tmp.path(), "DATTSVT.csv", &["202401,ИМ,643,0101210009,1,2,3"]);
        let original = std::fs::read_to_string(&artifact).unwrap();

        let period = Period::new(1, 2024).unwrap();
        let archived = archive_artifact(&artifact, &storage, &period).unwrap();

        assert_eq!(std::fs::read_to_string(archived).unwrap(), original);
    }
}
