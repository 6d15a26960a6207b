//! Property-based tests for the tensor index
//!
//! These tests use proptest to check structural invariants of the index
//! over random observation sets.

#[cfg(test)]
mod tests {
    use crate::{ObservationError, ObservationSet, TensorIndex};
    use proptest::prelude::*;

    fn observations_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<Vec<usize>>)> {
        prop::collection::vec(1usize..6, 1..4).prop_flat_map(|cards| {
            let row = cards
                .iter()
                .map(|&c| 1..=c)
                .collect::<Vec<_>>();
            (Just(cards), prop::collection::vec(row, 0..40))
        })
    }

    proptest! {
        // Property: every observation row appears exactly once per dimension,
        // under the value it carries
        #[test]
        fn index_partitions_rows((cards, rows) in observations_strategy()) {
            let n = rows.len();
            let scores = vec![1.0f64; n];
            let obs = ObservationSet::new(rows.clone(), scores).unwrap();
            let index = TensorIndex::build(&obs, &cards).unwrap();

            for (dim, &card) in cards.iter().enumerate() {
                let mut seen = vec![0usize; n];
                for value in 0..card {
                    let list = index.rows(dim, value);
                    prop_assert!(list.windows(2).all(|w| w[0] < w[1]));
                    for &r in list {
                        prop_assert_eq!(rows[r][dim], value + 1);
                        seen[r] += 1;
                    }
                }
                prop_assert!(seen.iter().all(|&c| c == 1));
            }
        }

        // Property: occurrence counts sum to the number of observations
        #[test]
        fn counts_sum_to_rows((cards, rows) in observations_strategy()) {
            let n = rows.len();
            let obs = ObservationSet::new(rows, vec![0.5f64; n]).unwrap();
            let index = TensorIndex::build(&obs, &cards).unwrap();

            for dim in 0..cards.len() {
                let counts = index.occurrence_counts(dim);
                prop_assert_eq!(counts.len(), cards[dim]);
                prop_assert_eq!(counts.iter().sum::<usize>(), n);
            }
        }

        // Property: a value one past the cardinality is always rejected
        #[test]
        fn overflow_value_rejected(card in 1usize..10, other in 1usize..5) {
            let obs = ObservationSet::new(vec![vec![card + 1, 1]], vec![1.0f64]).unwrap();
            let err = TensorIndex::build(&obs, &[card, other]).unwrap_err();
            prop_assert_eq!(
                err,
                ObservationError::DimensionBounds {
                    dimension: 0,
                    row: 0,
                    value: card + 1,
                    cardinality: card,
                }
            );
        }
    }
}
