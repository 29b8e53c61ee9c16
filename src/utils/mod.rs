// file: src/utils/mod.rs
// version: 1.0.0
// guid: 7f3c1a52-6b8e-4d2f-9a41-3e5d8c0b7a16

//! Utility functions and helpers

pub mod system;

pub use system::SystemUtils;
