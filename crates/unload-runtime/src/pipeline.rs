//! Per-period pipeline orchestration.
//!
//! Drives one period through wait → extract → normalize → aggregate →
//! encode → append. Stages run strictly sequentially and each fully
//! materializes its output before the next begins; the master-file append is
//! the only external mutation, so a fatal error in any earlier stage leaves
//! no partial state behind.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;
use unload_core::error::Result;
use unload_core::period::Period;
use unload_core::reference::ReferenceSet;
use unload_data::{aggregator, encoder, extract, normalizer, store};

use crate::agent::ExportAgent;
use crate::wait::ExportWaitMonitor;

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything the pipeline needs to process periods.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory the export agent deposits artifacts into.
    pub drop_dir: PathBuf,
    /// Directory holding consumed artifacts and the master file.
    pub storage_dir: PathBuf,
    /// The artifact's fixed file name.
    pub artifact_name: String,
    /// Full path of the master dataset file.
    pub master_path: PathBuf,
    /// Sleep between artifact polls.
    pub poll_interval: Duration,
    /// Polls before the wait monitor gives up.
    pub max_attempts: u32,
}

/// Row counts and data-quality signals from one period run.
#[derive(Debug, Clone)]
pub struct PeriodSummary {
    /// Compact period key, e.g. `"12024"`.
    pub period_key: String,
    /// Rows read from the artifact.
    pub raw_rows: usize,
    /// Records after key-grouped summation.
    pub normalized_rows: usize,
    /// Long-form rows across all four granularities.
    pub expanded_rows: usize,
    /// Rows appended to the master file.
    pub appended_rows: usize,
    /// Categorical values left unencoded by dictionary misses.
    pub unencoded_values: u64,
}

// ── UnloadPipeline ────────────────────────────────────────────────────────────

/// Sequential pipeline over one or more reporting periods.
pub struct UnloadPipeline {
    config: PipelineConfig,
    references: ReferenceSet,
}

impl UnloadPipeline {
    pub fn new(config: PipelineConfig, references: ReferenceSet) -> Self {
        Self { config, references }
    }

    /// Run every period in order, stopping at the first fatal error.
    ///
    /// A period's rows are either fully appended or not at all, so an error
    /// part-way through the list leaves the master file with whole periods
    /// only.
    pub async fn run(
        &self,
        agent: &dyn ExportAgent,
        periods: &[Period],
    ) -> Result<Vec<PeriodSummary>> {
        let mut summaries = Vec::with_capacity(periods.len());
        for period in periods {
            summaries.push(self.run_period(agent, period).await?);
        }
        Ok(summaries)
    }

    /// Process a single period end to end.
    pub async fn run_period(
        &self,
        agent: &dyn ExportAgent,
        period: &Period,
    ) -> Result<PeriodSummary> {
        let label = period.label();
        info!("Processing period {label}");

        let monitor = ExportWaitMonitor::new(
            self.config.drop_dir.clone(),
            self.config.artifact_name.clone(),
            self.config.poll_interval,
            self.config.max_attempts,
        );
        let artifact = monitor.wait_for_artifact(agent, &label).await?;

        let archived = extract::archive_artifact(&artifact, &self.config.storage_dir, period)?;
        let raw = extract::read_artifact_rows(&archived)?;
        let raw_rows = raw.len();

        let normalized = normalizer::normalize(&raw)?;
        let normalized_rows = normalized.len();

        let expanded = aggregator::expand(normalized, &self.references)?;
        let expanded_rows = expanded.len();

        let outcome = encoder::encode(expanded, &self.references);
        let appended_rows = store::append_to_master(&self.config.master_path, &outcome.rows)?;

        let summary = PeriodSummary {
            period_key: period.key(),
            raw_rows,
            normalized_rows,
            expanded_rows,
            appended_rows,
            unencoded_values: outcome.unencoded.total(),
        };
        info!(
            "Period {}: {} raw rows, {} normalized, {} long-form, {} appended, {} unencoded value(s)",
            summary.period_key,
            summary.raw_rows,
            summary.normalized_rows,
            summary.expanded_rows,
            summary.appended_rows,
            summary.unencoded_values,
        );
        Ok(summary)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
