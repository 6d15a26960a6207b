//! Predictor variants behind a single interface
//!
//! [`Predictor`] is a closed set: the tensor model plus two baselines used
//! for comparison and cold start. Every variant supports the same three
//! operations: `train`, `decision` and `export_model`.

use crate::error::TrainingError;
use crate::model::TensorCoFi;
use scirs2_core::ndarray_ext::Array2;
use scirs2_core::random::{rngs::StdRng, Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tcofi_kernels::FactorScalar;
use tcofi_sparse::ObservationSet;

/// Dimension holding item identifiers
pub const ITEM_DIMENSION: usize = 1;

/// Scores items by the summed score of all observations that reference them
///
/// Sums are computed once at training time. Items that never occur score
/// the empty sum, zero.
#[derive(Debug, Clone)]
pub struct PopularityPredictor<T> {
    n_items: usize,
    popularity: Option<Vec<T>>,
}

impl<T: FactorScalar> PopularityPredictor<T> {
    pub fn new(n_items: usize) -> Self {
        Self {
            n_items,
            popularity: None,
        }
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Popularity of every item, indexed 0-based
    pub fn popularity(&self) -> Option<&[T]> {
        self.popularity.as_deref()
    }

    pub fn train(&mut self, observations: &ObservationSet<T>) -> Result<(), TrainingError> {
        if observations.arity() <= ITEM_DIMENSION {
            return Err(TrainingError::DimensionMismatch {
                expected: ITEM_DIMENSION + 1,
                actual: observations.arity(),
            });
        }

        let mut sums = vec![T::zero(); self.n_items];
        for (r, (row, score)) in observations.iter().enumerate() {
            let item = row[ITEM_DIMENSION];
            if item == 0 || item > self.n_items {
                return Err(tcofi_sparse::ObservationError::DimensionBounds {
                    dimension: ITEM_DIMENSION,
                    row: r,
                    value: item,
                    cardinality: self.n_items,
                }
                .into());
            }
            sums[item - 1] += score;
        }

        self.popularity = Some(sums);
        log::debug!("Popularity computed for {} items", self.n_items);
        Ok(())
    }

    pub fn decision(&self, tuple: &[usize]) -> Result<T, TrainingError> {
        let popularity = self.popularity.as_ref().ok_or(TrainingError::NotTrained)?;
        let item = tuple
            .get(ITEM_DIMENSION)
            .copied()
            .ok_or_else(|| TrainingError::InvalidTuple {
                tuple: tuple.to_vec(),
                reason: "tuple has no item index".to_string(),
            })?;

        popularity
            .get(item)
            .copied()
            .ok_or_else(|| TrainingError::InvalidTuple {
                tuple: tuple.to_vec(),
                reason: format!("item index must be < {}", self.n_items),
            })
    }
}

/// Uniform `[0, 1)` scores, reproducible per seed and tuple
#[derive(Debug, Clone)]
pub struct RandomPredictor {
    seed: u64,
    arity: Option<usize>,
}

impl RandomPredictor {
    pub fn new(seed: u64) -> Self {
        Self { seed, arity: None }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn train<T: FactorScalar>(&mut self, observations: &ObservationSet<T>) -> Result<(), TrainingError> {
        self.arity = Some(observations.arity());
        Ok(())
    }

    pub fn decision<T: FactorScalar>(&self, tuple: &[usize]) -> Result<T, TrainingError> {
        let arity = self.arity.ok_or(TrainingError::NotTrained)?;
        if tuple.len() != arity {
            return Err(TrainingError::InvalidTuple {
                tuple: tuple.to_vec(),
                reason: format!("expected {} indices", arity),
            });
        }

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        tuple.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());

        Ok(T::from_f64(rng.random::<f64>()).unwrap_or_else(T::zero))
    }
}

/// A trainable scoring model
#[derive(Debug, Clone)]
pub enum Predictor<T> {
    TensorCoFi(TensorCoFi<T>),
    Popularity(PopularityPredictor<T>),
    Random(RandomPredictor),
}

impl<T: FactorScalar> Predictor<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Predictor::TensorCoFi(_) => "TensorCoFi",
            Predictor::Popularity(_) => "Popularity",
            Predictor::Random(_) => "Random",
        }
    }

    pub fn train(&mut self, observations: &ObservationSet<T>) -> Result<(), TrainingError> {
        match self {
            Predictor::TensorCoFi(model) => model.train(observations).map(|_| ()),
            Predictor::Popularity(model) => model.train(observations),
            Predictor::Random(model) => model.train(observations),
        }
    }

    /// Score a 0-based tuple
    pub fn decision(&self, tuple: &[usize]) -> Result<T, TrainingError> {
        match self {
            Predictor::TensorCoFi(model) => model.decision(tuple),
            Predictor::Popularity(model) => model.decision(tuple),
            Predictor::Random(model) => model.decision(tuple),
        }
    }

    /// Factor matrices to persist; baselines export an empty model
    pub fn export_model(&self) -> Result<Vec<Array2<T>>, TrainingError> {
        match self {
            Predictor::TensorCoFi(model) => model.export_model(),
            Predictor::Popularity(model) => {
                model.popularity.as_ref().ok_or(TrainingError::NotTrained)?;
                Ok(Vec::new())
            }
            Predictor::Random(model) => {
                model.arity.ok_or(TrainingError::NotTrained)?;
                Ok(Vec::new())
            }
        }
    }
}

impl<T> From<TensorCoFi<T>> for Predictor<T> {
    fn from(model: TensorCoFi<T>) -> Self {
        Predictor::TensorCoFi(model)
    }
}

impl<T> From<PopularityPredictor<T>> for Predictor<T> {
    fn from(model: PopularityPredictor<T>) -> Self {
        Predictor::Popularity(model)
    }
}

impl<T> From<RandomPredictor> for Predictor<T> {
    fn from(model: RandomPredictor) -> Self {
        Predictor::Random(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainConfig;

    fn observations() -> ObservationSet<f64> {
        ObservationSet::new(
            vec![vec![1, 1], vec![2, 1], vec![2, 3], vec![3, 1]],
            vec![5.0, 3.0, -2.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_popularity_sums_scores() {
        let mut predictor = Predictor::from(PopularityPredictor::new(4));
        predictor.train(&observations()).unwrap();

        assert_eq!(predictor.decision(&[0, 0]).unwrap(), 9.0);
        assert_eq!(predictor.decision(&[2, 0]).unwrap(), 9.0);
        assert_eq!(predictor.decision(&[0, 2]).unwrap(), -2.0);
        assert_eq!(predictor.decision(&[0, 1]).unwrap(), 0.0);
        assert_eq!(predictor.decision(&[1, 3]).unwrap(), 0.0);
        assert!(predictor.decision(&[0, 4]).is_err());
        assert!(predictor.export_model().unwrap().is_empty());
    }

    #[test]
    fn test_popularity_rejects_out_of_range_item() {
        let mut predictor = PopularityPredictor::<f64>::new(2);
        let err = predictor.train(&observations()).unwrap_err();
        assert!(matches!(err, TrainingError::Observations(_)));
    }

    #[test]
    fn test_popularity_needs_item_dimension() {
        let obs = ObservationSet::new(vec![vec![1]], vec![1.0]).unwrap();
        let mut predictor = PopularityPredictor::<f64>::new(1);
        assert!(matches!(
            predictor.train(&obs),
            Err(TrainingError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_random_is_seeded() {
        let mut a = Predictor::<f64>::from(RandomPredictor::new(5));
        let mut b = Predictor::<f64>::from(RandomPredictor::new(5));
        a.train(&observations()).unwrap();
        b.train(&observations()).unwrap();

        for tuple in [[0, 0], [1, 2], [7, 3]] {
            let x = a.decision(&tuple).unwrap();
            assert_eq!(x, b.decision(&tuple).unwrap());
            assert!((0.0..1.0).contains(&x));
        }
        assert!(a.decision(&[0]).is_err());
    }

    #[test]
    fn test_untrained_predictors() {
        let random = Predictor::<f64>::from(RandomPredictor::new(1));
        assert!(matches!(random.decision(&[0, 0]), Err(TrainingError::NotTrained)));
        assert!(matches!(random.export_model(), Err(TrainingError::NotTrained)));

        let model = TensorCoFi::<f64>::new(TrainConfig::default(), vec![3, 4]).unwrap();
        let tensor = Predictor::from(model);
        assert_eq!(tensor.name(), "TensorCoFi");
        assert!(matches!(tensor.export_model(), Err(TrainingError::NotTrained)));
    }

    #[test]
    fn test_tensor_cofi_variant_exports_factors() {
        let config = TrainConfig::default().with_rank(3).with_iterations(2).with_seed(8);
        let mut predictor = Predictor::from(TensorCoFi::new(config, vec![3, 3]).unwrap());
        predictor.train(&observations()).unwrap();

        let model = predictor.export_model().unwrap();
        assert_eq!(model.len(), 2);
        assert_eq!(model[0].dim(), (3, 3));
        assert!(predictor.decision(&[1, 2]).unwrap().is_finite());
    }
}
