use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.tsvt-unload/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing
/// parents):
/// - `~/.tsvt-unload/`
/// - `~/.tsvt-unload/logs/`
/// - `~/.tsvt-unload/data/`
/// - `~/.tsvt-unload/reference/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let base = app_dir();
    std::fs::create_dir_all(&base)?;
    std::fs::create_dir_all(base.join("logs"))?;
    std::fs::create_dir_all(base.join("data"))?;
    std::fs::create_dir_all(base.join("reference"))?;
    Ok(())
}

/// The application's home directory, `~/.tsvt-unload/`.
fn app_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".tsvt-unload")
}

/// Default location of the master file and archived artifacts.
pub fn default_storage_dir() -> PathBuf {
    app_dir().join("data")
}

/// Default location of the reference dictionaries.
pub fn default_reference_dir() -> PathBuf {
    app_dir().join("reference")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    // Map Python-style log-level names to tracing level names.
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Drop-directory discovery ───────────────────────────────────────────────────

/// Attempt to locate the directory the export agent deposits artifacts into.
///
/// Checks the following and returns the first that exists:
/// 1. The platform downloads directory.
/// 2. `~/Downloads/`
///
/// Returns `None` when neither exists; the caller then requires an explicit
/// `--drop-dir`.
pub fn discover_drop_dir() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(downloads) = dirs::download_dir() {
        candidates.push(downloads);
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join("Downloads"));
    }
    candidates.into_iter().find(|p| p.is_dir())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
