//! # tcofi-exec
//!
//! Integration layer for TCoFi: the contracts a data source and a model
//! sink must satisfy, in-memory implementations of both, and
//! [`ModelBuilder`], which runs extract → train → load for a named
//! predictor.
//!
//! ```
//! use tcofi_decomp::TrainConfig;
//! use tcofi_exec::{MemorySink, MemorySource, ModelBuilder, DEFAULT_NAME};
//! use tcofi_sparse::ObservationSet;
//!
//! let obs = ObservationSet::new(vec![vec![1, 1], vec![2, 2]], vec![4.0, 1.0])?;
//! let sink = MemorySink::new();
//!
//! let mut builder = ModelBuilder::new(MemorySource::new(obs, vec![2, 2])?)
//!     .with_tensor_cofi(DEFAULT_NAME, TrainConfig::default().with_rank(3).with_seed(1))?
//!     .with_sink(DEFAULT_NAME, sink.clone());
//!
//! builder.run_default()?;
//! assert_eq!(sink.writes(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod builder;
pub mod source;

// Re-exports
pub use builder::*;
pub use source::*;
