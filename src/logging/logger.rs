// file: src/logging/logger.rs
// version: 1.0.0
// guid: f1727fc4-cd12-4d2b-8f3f-554b38946560

//! Logger initialization and configuration

use crate::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the log filter for the given verbosity flags.
///
/// `quiet` wins over `verbose` when both are set.
pub fn level_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Initialize the logging system
pub fn init_logger(verbose: bool, quiet: bool) -> Result<()> {
    let filter = EnvFilter::new(level_filter(verbose, quiet));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .map_err(|e| crate::error::BidsAppError::config(format!("Failed to initialize logger: {}", e)))?;

    Ok(())
}

/// Run `f` inside an info span named after the current subject
pub fn with_subject_span<F, R>(subject: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let span = tracing::info_span!("subject", label = subject);
    let _enter = span.enter();
    f()
}
