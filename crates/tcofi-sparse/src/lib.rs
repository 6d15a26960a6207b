//! # tcofi-sparse
//!
//! Sparse observation storage for TCoFi.
//!
//! This crate provides:
//! - [`ObservationSet`]: immutable weighted observations in COO layout,
//!   1-based coordinates as delivered by data sources
//! - [`TensorIndex`]: per-dimension inverted index from each value to the
//!   ordered observation rows containing it, with bounds validation
//! - Occurrence counts per dimension value

pub mod index;
pub mod observations;

#[cfg(test)]
mod property_tests;

// Re-exports
pub use index::*;
pub use observations::*;
