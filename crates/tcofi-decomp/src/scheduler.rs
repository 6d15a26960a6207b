//! Column-range scheduling for a dimension sweep
//!
//! A sweep recomputes every column of one factor matrix. Columns are
//! independent given the base and the fixed factors, so the matrix is cut
//! into contiguous [`ColumnRange`]s, each handed to a task that owns a
//! disjoint mutable view. No locking is needed: the split itself guarantees
//! that no two tasks touch the same column.
//!
//! # Parallel Execution
//!
//! The parallel path uses a dedicated rayon pool built once per training
//! run. All tasks of a sweep are joined before the sweep returns. Panics
//! inside a task are caught and surfaced as [`TrainingError::WorkerTask`];
//! when several tasks fail, the error of the lowest range wins.

use crate::config::ExecutionStrategy;
use crate::error::TrainingError;
use crate::solver::EntrySolver;
use rayon::prelude::*;
use scirs2_core::ndarray_ext::{ArrayViewMut2, Axis};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tcofi_kernels::{FactorScalar, KernelError};

/// Half-open range of entries `[start, end)` of one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRange {
    pub start: usize,
    pub end: usize,
}

impl ColumnRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Chunk width used to split `cardinality` entries across `workers`
pub fn chunk_step(cardinality: usize, workers: usize) -> usize {
    (cardinality / workers.max(1)).max(1)
}

/// Contiguous ranges of width [`chunk_step`] covering `0..cardinality`
///
/// The last range is shorter when the width does not divide the
/// cardinality.
///
/// # Examples
///
/// ```
/// use tcofi_decomp::{partition, ColumnRange};
///
/// let ranges = partition(10, 4);
/// assert_eq!(ranges.len(), 5);
/// assert_eq!(ranges[0], ColumnRange { start: 0, end: 2 });
/// assert_eq!(ranges[4], ColumnRange { start: 8, end: 10 });
/// ```
pub fn partition(cardinality: usize, workers: usize) -> Vec<ColumnRange> {
    let step = chunk_step(cardinality, workers);
    (0..cardinality)
        .step_by(step)
        .map(|start| ColumnRange {
            start,
            end: (start + step).min(cardinality),
        })
        .collect()
}

/// Executes dimension sweeps with a fixed execution strategy
pub enum Scheduler {
    Sequential,
    Parallel {
        pool: rayon::ThreadPool,
        workers: usize,
    },
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheduler::Sequential => write!(f, "Scheduler::Sequential"),
            Scheduler::Parallel { workers, .. } => {
                write!(f, "Scheduler::Parallel {{ workers: {} }}", workers)
            }
        }
    }
}

impl Scheduler {
    /// Create the scheduler, building the worker pool if needed
    ///
    /// # Errors
    ///
    /// [`TrainingError::ThreadPool`] if the pool cannot be built.
    pub fn new(strategy: ExecutionStrategy) -> Result<Self, TrainingError> {
        match strategy {
            ExecutionStrategy::Sequential => Ok(Scheduler::Sequential),
            ExecutionStrategy::Parallel { workers } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers.max(1))
                    .thread_name(|i| format!("tcofi-worker-{}", i))
                    .build()
                    .map_err(|e| TrainingError::ThreadPool(e.to_string()))?;
                log::debug!("Built worker pool with {} threads", workers);
                Ok(Scheduler::Parallel { pool, workers })
            }
        }
    }

    pub fn workers(&self) -> usize {
        match self {
            Scheduler::Sequential => 1,
            Scheduler::Parallel { workers, .. } => *workers,
        }
    }

    /// Recompute every column of `target` with `solver`
    ///
    /// Returns only after all columns have been processed or a failure has
    /// been collected from every task.
    pub fn sweep<T>(
        &self,
        solver: &EntrySolver<'_, T>,
        mut target: ArrayViewMut2<'_, T>,
    ) -> Result<(), TrainingError>
    where
        T: FactorScalar,
    {
        let card = target.ncols();
        if target.nrows() != solver.rank() || card != solver.n_entries() {
            return Err(KernelError::dimension_mismatch(
                "Scheduler::sweep",
                vec![solver.rank(), solver.n_entries()],
                vec![target.nrows(), card],
                format!("Target factor of dimension {}", solver.dimension()),
            )
            .into());
        }

        match self {
            Scheduler::Sequential => solver.solve_block(0, &mut target),
            Scheduler::Parallel { pool, workers } => {
                if *workers > card {
                    log::warn!(
                        "{} workers requested for dimension {} with only {} entries",
                        workers,
                        solver.dimension(),
                        card
                    );
                }

                let step = chunk_step(card, *workers);
                let tasks: Vec<(ColumnRange, ArrayViewMut2<'_, T>)> = target
                    .axis_chunks_iter_mut(Axis(1), step)
                    .enumerate()
                    .map(|(i, block)| {
                        let start = i * step;
                        let range = ColumnRange {
                            start,
                            end: start + block.ncols(),
                        };
                        (range, block)
                    })
                    .collect();

                log::trace!(
                    "Dimension {}: {} tasks of width {}",
                    solver.dimension(),
                    tasks.len(),
                    step
                );

                // Results come back in range order
                let results: Vec<Result<(), TrainingError>> = pool.install(|| {
                    tasks
                        .into_par_iter()
                        .map(|(range, mut block)| {
                            run_task(solver.dimension(), solver.iteration(), range, || {
                                solver.solve_block(range.start, &mut block)
                            })
                        })
                        .collect()
                });

                results.into_iter().collect()
            }
        }
    }
}

fn run_task<F>(
    dimension: usize,
    iteration: usize,
    range: ColumnRange,
    task: F,
) -> Result<(), TrainingError>
where
    F: FnOnce() -> Result<(), TrainingError>,
{
    match catch_unwind(AssertUnwindSafe(task)) {
        Ok(result) => result,
        Err(payload) => Err(TrainingError::WorkerTask {
            dimension,
            iteration,
            range,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
