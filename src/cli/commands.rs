// file: src/cli/commands.rs
// version: 1.0.0
// guid: 9b2e4f71-3c8a-4e65-b0d7-5a1f6c3e2d48

//! Command implementations for the CLI

use crate::{
    bids::BidsLayout,
    config::RunConfig,
    executor::{DryRunRunner, Executor, ProcessRunner},
    pipeline,
    utils::system::SystemUtils,
    Result,
};
use tracing::info;

/// Plan and run the configured analysis
pub async fn run_analysis_command(config: &RunConfig) -> Result<()> {
    info!(
        "Running {} level analysis of {}",
        config.analysis_level.as_str(),
        config.bids_dir.display()
    );

    let layout = BidsLayout::new(&config.bids_dir)?;
    let plan = pipeline::build_plan(config, &layout)?;
    info!("Planned {} commands", plan.len());

    if config.dry_run {
        let mut executor = Executor::new(DryRunRunner);
        return executor.execute(&plan).await;
    }

    let missing = SystemUtils::missing_programs(&plan);
    if !missing.is_empty() {
        return Err(crate::error::BidsAppError::CommandNotFound(missing.join(", ")));
    }

    tokio::fs::create_dir_all(&config.output_dir).await?;

    let mut executor = Executor::new(ProcessRunner::new());
    executor.execute(&plan).await
}
