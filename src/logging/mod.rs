// file: src/logging/mod.rs
// version: 1.0.0
// guid: 4d15d9ae-25a1-44a9-a346-313bc751e5c3

//! Logging system for the FreeSurfer BIDS app

pub mod logger;

pub use logger::init_logger;
