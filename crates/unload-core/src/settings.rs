use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Periodic unload of foreign-trade statistics into the master dataset
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tsvt-unload",
    about = "Periodic unload of foreign-trade statistics into the master dataset",
    version
)]
pub struct Settings {
    /// Periods to unload: `latest`, `M.YYYY`, a comma list, or `M.YYYY-M.YYYY`
    #[arg(long, default_value = "latest")]
    pub periods: String,

    /// Directory watched for the deposited export artifact
    #[arg(long)]
    pub drop_dir: Option<PathBuf>,

    /// Directory holding consumed artifacts and the master file
    #[arg(long)]
    pub storage_dir: Option<PathBuf>,

    /// Directory holding the reference dictionary files
    #[arg(long)]
    pub reference_dir: Option<PathBuf>,

    /// Master dataset file name within the storage directory
    #[arg(long, default_value = "TSVTdata.csv")]
    pub master_file: String,

    /// Fixed name the export agent gives the deposited artifact
    #[arg(long, default_value = "DATTSVT.csv")]
    pub artifact_name: String,

    /// Seconds between artifact polls (1-600)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=600))]
    pub poll_interval: u32,

    /// Polling attempts before giving up (1-1000)
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub max_attempts: u32,

    /// External command invoked with the period label to request an export
    #[arg(long)]
    pub export_command: Option<String>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.tsvt-unload/last_used.json`.
///
/// Only the machine-specific knobs are remembered; the period selection is
/// always taken from the command line.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_command: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.tsvt-unload/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".tsvt-unload").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to the default path, creating parent
    /// directories if needed.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the default config file if it exists.
    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`load_with_last_used`](Self::load_with_last_used) but accepts
    /// an explicit argument list, enabling unit-testing without spawning
    /// subprocesses.
    pub fn load_with_last_used_from_args(args: Vec<std::ffi::OsString>) -> Self {
        Self::load_with_last_used_impl(args, &LastUsedParams::config_path())
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());

        // Parse into the typed struct using the same args.
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug_flag(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // Merge last-used values for fields that were NOT explicitly set on
        // the command line (CLI always wins). The period selection is never
        // loaded from last-used.
        if !is_arg_explicitly_set(&matches, "drop_dir") && settings.drop_dir.is_none() {
            settings.drop_dir = last.drop_dir;
        }
        if !is_arg_explicitly_set(&matches, "storage_dir") && settings.storage_dir.is_none() {
            settings.storage_dir = last.storage_dir;
        }
        if !is_arg_explicitly_set(&matches, "reference_dir") && settings.reference_dir.is_none() {
            settings.reference_dir = last.reference_dir;
        }
        if !is_arg_explicitly_set(&matches, "export_command") && settings.export_command.is_none() {
            settings.export_command = last.export_command;
        }

        settings = Self::apply_debug_flag(settings);

        // Persist current settings for next run.
        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug_flag(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            drop_dir: s.drop_dir.clone(),
            storage_dir: s.storage_dir.clone(),
            reference_dir: s.reference_dir.clone(),
            export_command: s.export_command.clone(),
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    fn args(items: &[&str]) -> Vec<OsString> {
        std::iter::once("tsvt-unload")
            .chain(items.iter().copied())
            .map(OsString::from)
            .collect()
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            drop_dir: Some(PathBuf::from("/srv/downloads")),
            storage_dir: Some(PathBuf::from("/srv/tsvt")),
            reference_dir: Some(PathBuf::from("/srv/tsvt/reference")),
            export_command: Some("/usr/local/bin/unload-agent".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.drop_dir, Some(PathBuf::from("/srv/downloads")));
        assert_eq!(loaded.storage_dir, Some(PathBuf::from("/srv/tsvt")));
        assert_eq!(
            loaded.reference_dir,
            Some(PathBuf::from("/srv/tsvt/reference"))
        );
        assert_eq!(
            loaded.export_command,
            Some("/usr/local/bin/unload-agent".to_string())
        );
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.drop_dir.is_none());
        assert!(loaded.storage_dir.is_none());
        assert!(loaded.reference_dir.is_none());
        assert!(loaded.export_command.is_none());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            drop_dir: Some(PathBuf::from("/tmp/x")),
            ..Default::default()
        };
        params.save_to(&path).expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    // ── Settings defaults ─────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["tsvt-unload"]);

        assert_eq!(settings.periods, "latest");
        assert!(settings.drop_dir.is_none());
        assert!(settings.storage_dir.is_none());
        assert!(settings.reference_dir.is_none());
        assert_eq!(settings.master_file, "TSVTdata.csv");
        assert_eq!(settings.artifact_name, "DATTSVT.csv");
        assert_eq!(settings.poll_interval, 10);
        assert_eq!(settings.max_attempts, 30);
        assert!(settings.export_command.is_none());
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    // ── Merge behaviour ───────────────────────────────────────────────────────

    #[test]
    fn test_merge_uses_last_used_when_not_on_cli() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            drop_dir: Some(PathBuf::from("/srv/downloads")),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&[]), &path);
        assert_eq!(settings.drop_dir, Some(PathBuf::from("/srv/downloads")));
    }

    #[test]
    fn test_merge_cli_wins_over_last_used() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            drop_dir: Some(PathBuf::from("/srv/old")),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(args(&["--drop-dir", "/srv/new"]), &path);
        assert_eq!(settings.drop_dir, Some(PathBuf::from("/srv/new")));
    }

    #[test]
    fn test_merge_persists_for_next_run() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let _ = Settings::load_with_last_used_impl(
            args(&["--storage-dir", "/srv/tsvt"]),
            &path,
        );

        let saved = LastUsedParams::load_from(&path);
        assert_eq!(saved.storage_dir, Some(PathBuf::from("/srv/tsvt")));
    }

    #[test]
    fn test_clear_flag_removes_saved_config() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            drop_dir: Some(PathBuf::from("/srv/downloads")),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(args(&["--clear"]), &path);
        assert!(!path.exists());
        assert!(settings.drop_dir.is_none());
    }

    #[test]
    fn test_debug_flag_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(args(&["--debug"]), &path);
        assert_eq!(settings.log_level, "DEBUG");
    }
}
