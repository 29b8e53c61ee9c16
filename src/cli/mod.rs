// file: src/cli/mod.rs
// version: 1.0.0
// guid: 2d6a8e13-5f47-4b9c-a0e2-8c71d4f5b396

//! Command line interface for the FreeSurfer BIDS app

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::*;
