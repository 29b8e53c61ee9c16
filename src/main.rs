// file: src/main.rs
// version: 1.0.0
// guid: 8c4f2b96-1d73-4a58-9e0b-f5a6c2d83e71

//! FreeSurfer BIDS app - Main entry point

use clap::Parser;
use freesurfer_bids_app::{
    cli::{args::version_requested, run_analysis_command, Cli},
    config::loader::ConfigLoader,
    logging::logger,
    Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    let loader = ConfigLoader::new();

    if version_requested(std::env::args_os().map(|a| a.to_string_lossy().into_owned())) {
        println!("BIDS-App example version {}", loader.version());
        return Ok(());
    }

    let cli = Cli::parse();

    logger::init_logger(cli.verbose, cli.quiet)?;

    let config = loader.load_run_config(&cli)?;
    run_analysis_command(&config).await
}
