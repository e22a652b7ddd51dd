//! The export-agent boundary.
//!
//! The real export agent drives the portal's web UI and is a black box to
//! this pipeline: it takes a period filter and, asynchronously and
//! out-of-band, deposits a fixed-name artifact in the drop directory. The
//! only channels between the two are the trigger action modelled here and
//! the artifact's presence on disk.

use std::process::Command;

use tracing::{debug, info};
use unload_core::error::{Result, UnloadError};

/// Anything that can ask the portal for one period's export.
pub trait ExportAgent {
    /// Trigger an export for the period identified by `period_label`.
    ///
    /// The wait monitor re-issues this on every poll that finds no artifact,
    /// so implementations see at-least-once triggering per period.
    fn request_export(&self, period_label: &str) -> Result<()>;
}

// ── CommandExportAgent ────────────────────────────────────────────────────────

/// Spawns a configured external command with the period label as its final
/// argument and waits for it to exit.
#[derive(Debug)]
pub struct CommandExportAgent {
    command: Vec<String>,
}

impl CommandExportAgent {
    /// Build from a whitespace-separated command line.
    pub fn new(command_line: &str) -> Result<Self> {
        let command: Vec<String> = command_line
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if command.is_empty() {
            return Err(UnloadError::Config("export command is empty".to_string()));
        }
        Ok(Self { command })
    }
}

impl ExportAgent for CommandExportAgent {
    fn request_export(&self, period_label: &str) -> Result<()> {
        debug!("Requesting export for {period_label:?} via {:?}", self.command[0]);
        let status = Command::new(&self.command[0])
            .args(&self.command[1..])
            .arg(period_label)
            .status()
            .map_err(|e| UnloadError::Agent(format!("{}: {e}", self.command[0])))?;

        if !status.success() {
            return Err(UnloadError::Agent(format!(
                "{} exited with {status}",
                self.command[0]
            )));
        }
        Ok(())
    }
}

// ── ManualExportAgent ─────────────────────────────────────────────────────────

/// Fallback agent used when no export command is configured: tells the
/// operator what to request in the portal by hand.
pub struct ManualExportAgent;

impl ExportAgent for ManualExportAgent {
    fn request_export(&self, period_label: &str) -> Result<()> {
        info!("No export command configured; request period {period_label:?} in the portal manually");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_agent_rejects_empty_command() {
        let err = CommandExportAgent::new("   ").unwrap_err();
        assert!(matches!(err, UnloadError::Config(_)));
    }

    #[test]
    fn test_command_agent_runs_and_succeeds() {
        let agent = CommandExportAgent::new("true").unwrap();
        agent.request_export("январь 2024 г.").unwrap();
    }

    #[test]
    fn test_command_agent_surfaces_nonzero_exit() {
        let agent = CommandExportAgent::new("false").unwrap();
        let err = agent.request_export("январь 2024 г.").unwrap_err();
        assert!(matches!(err, UnloadError::Agent(_)));
    }

    #[test]
    fn test_command_agent_missing_binary() {
        let agent = CommandExportAgent::new("/no/such/binary-xyz").unwrap();
        let err = agent.request_export("январь 2024 г.").unwrap_err();
        assert!(matches!(err, UnloadError::Agent(_)));
    }

    #[test]
    fn test_manual_agent_always_succeeds() {
        ManualExportAgent.request_export("май 2024 г.").unwrap();
    }
}
