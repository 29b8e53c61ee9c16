// file: src/lib.rs
// version: 1.0.0
// guid: 3a9d5c27-8e14-4f6b-b2c8-6d0e7f1a4b53

//! # FreeSurfer BIDS app
//!
//! Runs FreeSurfer's `recon-all` over the subjects and sessions of a BIDS
//! dataset (participant level) and builds a study specific surface template
//! with `make_average_subject`/`mris_register` (group level).
//!
//! All reconstruction work is done by the FreeSurfer binaries; this crate
//! discovers the inputs, plans the command sequence and runs it.

pub mod bids;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod freesurfer;
pub mod logging;
pub mod pipeline;
pub mod utils;

pub use error::{BidsAppError, Result};

/// Version information for the utility
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
