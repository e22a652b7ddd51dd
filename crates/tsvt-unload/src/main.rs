mod bootstrap;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use unload_core::period::{Period, PeriodSelection};
use unload_core::reference::ReferenceSet;
use unload_core::settings::Settings;
use unload_runtime::agent::{CommandExportAgent, ExportAgent, ManualExportAgent};
use unload_runtime::pipeline::{PipelineConfig, UnloadPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("tsvt-unload v{} starting", env!("CARGO_PKG_VERSION"));

    let selection = PeriodSelection::parse(&settings.periods)?;
    let today = Utc::now().date_naive();
    let periods = selection.expand(today)?;
    tracing::info!(
        "Periods to unload: {}",
        periods
            .iter()
            .map(Period::label)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let drop_dir = settings
        .drop_dir
        .clone()
        .or_else(bootstrap::discover_drop_dir)
        .context("no drop directory configured and none could be discovered; pass --drop-dir")?;
    let storage_dir = settings
        .storage_dir
        .clone()
        .unwrap_or_else(bootstrap::default_storage_dir);
    let reference_dir = settings
        .reference_dir
        .clone()
        .unwrap_or_else(bootstrap::default_reference_dir);

    tracing::info!(
        "Drop dir: {}, storage dir: {}, reference dir: {}",
        drop_dir.display(),
        storage_dir.display(),
        reference_dir.display()
    );

    let references = ReferenceSet::load(&reference_dir)?;

    let agent: Box<dyn ExportAgent> = match settings.export_command.as_deref() {
        Some(command) => Box::new(CommandExportAgent::new(command)?),
        None => Box::new(ManualExportAgent),
    };

    let config = PipelineConfig {
        drop_dir,
        storage_dir: storage_dir.clone(),
        artifact_name: settings.artifact_name.clone(),
        master_path: storage_dir.join(&settings.master_file),
        poll_interval: Duration::from_secs(u64::from(settings.poll_interval)),
        max_attempts: settings.max_attempts,
    };

    let pipeline = UnloadPipeline::new(config, references);
    let summaries = pipeline.run(agent.as_ref(), &periods).await?;

    let total_appended: usize = summaries.iter().map(|s| s.appended_rows).sum();
    let total_unencoded: u64 = summaries.iter().map(|s| s.unencoded_values).sum();
    tracing::info!(
        "Done: {} period(s), {} rows appended, {} unencoded value(s)",
        summaries.len(),
        total_appended,
        total_unencoded
    );

    Ok(())
}
