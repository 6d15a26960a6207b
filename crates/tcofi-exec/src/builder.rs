//! Extract-train-load pipeline
//!
//! A [`ModelBuilder`] wires one observation source to named predictors and
//! named sinks. [`ModelBuilder::extract_transform_load`] reads the data,
//! trains the predictor registered under a name and hands its exported model
//! to the sink registered under the same name.

use crate::source::{ModelSink, ObservationSource};
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::time::Instant;
use tcofi_decomp::{Predictor, TensorCoFi, TrainConfig};
use tcofi_kernels::FactorScalar;

/// Name used when none is given
pub const DEFAULT_NAME: &str = "default";

/// Pipeline from a data source through named predictors to named sinks
pub struct ModelBuilder<T> {
    source: Box<dyn ObservationSource<T>>,
    predictors: HashMap<String, Predictor<T>>,
    sinks: HashMap<String, Box<dyn ModelSink<T>>>,
}

impl<T: FactorScalar> ModelBuilder<T> {
    pub fn new(source: impl ObservationSource<T> + 'static) -> Self {
        Self {
            source: Box::new(source),
            predictors: HashMap::new(),
            sinks: HashMap::new(),
        }
    }

    /// Register a predictor, replacing any previous one with that name
    pub fn with_predictor(mut self, name: impl Into<String>, predictor: impl Into<Predictor<T>>) -> Self {
        self.predictors.insert(name.into(), predictor.into());
        self
    }

    /// Register a TensorCoFi predictor sized from the source cardinalities
    ///
    /// # Errors
    ///
    /// Returns error if the source cannot report cardinalities or the
    /// configuration is invalid.
    pub fn with_tensor_cofi(self, name: impl Into<String>, config: TrainConfig) -> Result<Self> {
        let cardinalities = self
            .source
            .cardinalities()
            .context("Failed to read cardinalities from source")?;
        let model = TensorCoFi::new(config, cardinalities)?;
        Ok(self.with_predictor(name, model))
    }

    /// Register a sink, replacing any previous one with that name
    pub fn with_sink(mut self, name: impl Into<String>, sink: impl ModelSink<T> + 'static) -> Self {
        self.sinks.insert(name.into(), Box::new(sink));
        self
    }

    pub fn predictor(&self, name: &str) -> Option<&Predictor<T>> {
        self.predictors.get(name)
    }

    /// Registered predictor names, sorted
    pub fn predictor_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.predictors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Read, train and write the pipeline registered under `name`
    ///
    /// The sink is called exactly once, after training succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if `name` has no predictor or no sink, or if reading,
    /// training or writing fails. Nothing is written on failure.
    pub fn extract_transform_load(&mut self, name: &str) -> Result<()> {
        let start = Instant::now();

        let predictor = self
            .predictors
            .get_mut(name)
            .ok_or_else(|| anyhow!("No predictor registered under '{}'", name))?;
        let sink = self
            .sinks
            .get_mut(name)
            .ok_or_else(|| anyhow!("No sink registered under '{}'", name))?;

        let observations = self
            .source
            .observations()
            .context("Failed to read observations from source")?;
        log::info!(
            "Pipeline '{}': extracted {} observations for {}",
            name,
            observations.len(),
            predictor.name()
        );

        predictor
            .train(&observations)
            .with_context(|| format!("Failed to train predictor '{}'", name))?;

        let model = predictor.export_model()?;
        sink.write_model(&model)
            .with_context(|| format!("Failed to write model '{}'", name))?;

        log::info!(
            "Pipeline '{}': wrote {} factor matrices in {:?}",
            name,
            model.len(),
            start.elapsed()
        );
        Ok(())
    }

    /// Run the pipeline registered under [`DEFAULT_NAME`]
    pub fn run_default(&mut self) -> Result<()> {
        self.extract_transform_load(DEFAULT_NAME)
    }
}
