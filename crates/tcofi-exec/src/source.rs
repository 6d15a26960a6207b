//! Data source and model sink contracts
//!
//! A pipeline reads observations from exactly one [`ObservationSource`] and
//! writes the trained factor matrices to a [`ModelSink`]. Both sides are
//! integration boundaries, so they report failures as `anyhow::Error`.
//!
//! The in-memory adapters here back tests and demos; persistent backends
//! implement the same traits.

use anyhow::{bail, Result};
use parking_lot::Mutex;
use scirs2_core::ndarray_ext::{Array2, ArrayView2};
use std::sync::Arc;
use tcofi_kernels::FactorScalar;
use tcofi_sparse::ObservationSet;

/// Supplies observations and the declared cardinality of every dimension
pub trait ObservationSource<T> {
    /// All observations, coordinates 1-based
    fn observations(&self) -> Result<ObservationSet<T>>;

    /// Cardinality per dimension
    ///
    /// May exceed the largest identifier in use; only an identifier above
    /// its cardinality is an error.
    fn cardinalities(&self) -> Result<Vec<usize>>;
}

/// Receives the trained model, one matrix per dimension in dimension order
pub trait ModelSink<T> {
    fn write_model(&mut self, factors: &[Array2<T>]) -> Result<()>;
}

/// Observations held in memory
#[derive(Debug, Clone)]
pub struct MemorySource<T> {
    observations: ObservationSet<T>,
    cardinalities: Vec<usize>,
}

impl<T: FactorScalar> MemorySource<T> {
    /// # Errors
    ///
    /// Returns error if the number of cardinalities differs from the
    /// observation arity.
    pub fn new(observations: ObservationSet<T>, cardinalities: Vec<usize>) -> Result<Self> {
        if !observations.is_empty() && observations.arity() != cardinalities.len() {
            bail!(
                "Source declares {} dimensions but observations have {}",
                cardinalities.len(),
                observations.arity()
            );
        }
        Ok(Self {
            observations,
            cardinalities,
        })
    }

    /// Cardinalities inferred as the largest identifier per dimension
    pub fn inferred(observations: ObservationSet<T>) -> Self {
        let cardinalities = observations.max_per_dimension();
        Self {
            observations,
            cardinalities,
        }
    }

    /// Dense matrix with 1-based index columns and a trailing score column
    pub fn from_matrix(data: &ArrayView2<T>, cardinalities: Vec<usize>) -> Result<Self> {
        let observations = ObservationSet::from_matrix(data)?;
        Self::new(observations, cardinalities)
    }
}

impl<T: FactorScalar> ObservationSource<T> for MemorySource<T> {
    fn observations(&self) -> Result<ObservationSet<T>> {
        Ok(self.observations.clone())
    }

    fn cardinalities(&self) -> Result<Vec<usize>> {
        Ok(self.cardinalities.clone())
    }
}

/// Collects written models in memory
///
/// Clones share storage, so a handle kept by the caller sees every model
/// written through a clone handed to a pipeline.
#[derive(Debug)]
pub struct MemorySink<T> {
    models: Arc<Mutex<Vec<Vec<Array2<T>>>>>,
}

impl<T> Clone for MemorySink<T> {
    fn clone(&self) -> Self {
        Self {
            models: Arc::clone(&self.models),
        }
    }
}

impl<T> Default for MemorySink<T> {
    fn default() -> Self {
        Self {
            models: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> MemorySink<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write_model` calls so far
    pub fn writes(&self) -> usize {
        self.models.lock().len()
    }

    /// Most recently written model
    pub fn last_model(&self) -> Option<Vec<Array2<T>>> {
        self.models.lock().last().cloned()
    }
}

impl<T: Clone> ModelSink<T> for MemorySink<T> {
    fn write_model(&mut self, factors: &[Array2<T>]) -> Result<()> {
        self.models.lock().push(factors.to_vec());
        Ok(())
    }
}
