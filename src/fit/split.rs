//! Seeded train/held-out split.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::AppError;

/// Row indices of one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_fraction)` rows.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<Split, AppError> {
    if !(test_fraction.is_finite() && (0.0..1.0).contains(&test_fraction)) {
        return Err(AppError::new(
            2,
            format!("Test fraction must be in [0, 1), got {test_fraction}."),
        ));
    }

    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n_test >= n {
        return Err(AppError::new(
            3,
            format!("Not enough rows to split: n={n}, held out={n_test}."),
        ));
    }

    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    let train = idx.split_off(n_test);
    Ok(Split { train, test: idx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_a_deterministic_partition() {
        let a = train_test_split(1500, 0.2, 42).unwrap();
        let b = train_test_split(1500, 0.2, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.test.len(), 300);
        assert_eq!(a.train.len(), 1200);

        let mut all: Vec<usize> = a.train.iter().chain(&a.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..1500).collect::<Vec<_>>());

        let c = train_test_split(1500, 0.2, 43).unwrap();
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn held_out_size_rounds_up() {
        let s = train_test_split(11, 0.2, 0).unwrap();
        assert_eq!(s.test.len(), 3);
        assert_eq!(s.train.len(), 8);

        let none = train_test_split(5, 0.0, 0).unwrap();
        assert!(none.test.is_empty());
    }

    #[test]
    fn rejects_degenerate_fractions() {
        assert_eq!(train_test_split(10, 1.0, 0).unwrap_err().exit_code(), 2);
        assert_eq!(train_test_split(10, -0.1, 0).unwrap_err().exit_code(), 2);
        assert_eq!(train_test_split(1, 0.5, 0).unwrap_err().exit_code(), 3);
    }
}
