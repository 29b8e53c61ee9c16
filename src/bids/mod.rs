// file: src/bids/mod.rs
// version: 1.0.0
// guid: d51a6888-71c2-4f17-bda0-0e86a9601ea7

//! BIDS dataset discovery

pub mod layout;

pub use layout::BidsLayout;
