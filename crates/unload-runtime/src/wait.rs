//! Bounded polling for the export artifact.
//!
//! The portal produces exports asynchronously; the only completion signal is
//! the artifact appearing under its fixed name in the drop directory. The
//! monitor re-triggers the export on every poll that finds nothing and gives
//! up with a typed timeout error once the attempt bound is reached.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time;
use tracing::{debug, info};
use unload_core::error::{Result, UnloadError};

use crate::agent::ExportAgent;

/// Waits for the export agent to deposit the artifact in the drop directory.
pub struct ExportWaitMonitor {
    drop_dir: PathBuf,
    artifact_name: String,
    poll_interval: Duration,
    max_attempts: u32,
}

impl ExportWaitMonitor {
    /// Create a new monitor.
    ///
    /// # Parameters
    /// - `drop_dir`      – directory the agent deposits the artifact into.
    /// - `artifact_name` – the artifact's fixed file name.
    /// - `poll_interval` – sleep between existence checks.
    /// - `max_attempts`  – polls before giving up with a timeout error.
    pub fn new(
        drop_dir: PathBuf,
        artifact_name: String,
        poll_interval: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            drop_dir,
            artifact_name,
            poll_interval,
            max_attempts,
        }
    }

    /// Full path the artifact is expected to appear at.
    pub fn artifact_path(&self) -> PathBuf {
        self.drop_dir.join(&self.artifact_name)
    }

    /// Block until the artifact exists, re-triggering the export on every
    /// miss.
    ///
    /// Returns the artifact path, or [`UnloadError::ExportUnavailable`] once
    /// `max_attempts` polls have found nothing. The loop holds no state
    /// between iterations, so cancelling between polls leaves nothing to
    /// roll back.
    pub async fn wait_for_artifact(
        &self,
        agent: &dyn ExportAgent,
        period_label: &str,
    ) -> Result<PathBuf> {
        let artifact = self.artifact_path();

        for attempt in 1..=self.max_attempts {
            if artifact.exists() {
                info!(
                    "Artifact {} present on poll {attempt}",
                    artifact.display()
                );
                return Ok(artifact);
            }

            debug!(
                "Poll {attempt}/{}: no artifact yet; requesting export",
                self.max_attempts
            );
            agent.request_export(period_label)?;
            time::sleep(self.poll_interval).await;
        }

        // The artifact may have landed during the final sleep.
        if artifact.exists() {
            return Ok(artifact);
        }

        Err(UnloadError::ExportUnavailable {
            period: period_label.to_string(),
            attempts: self.max_attempts,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
