//! Reference sample the attributions are measured against.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::StudentRecord;

/// Rows in the background sample.
pub const BACKGROUND_SIZE: usize = 100;
/// Seed for the background draw.
pub const BACKGROUND_SEED: u64 = 42;

/// Draw up to `size` rows without replacement.
///
/// Returns every row (in file order) when the dataset is not larger than `size`.
pub fn draw_background(records: &[StudentRecord], size: usize, seed: u64) -> Vec<StudentRecord> {
    if records.len() <= size {
        return records.to_vec();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    records.choose_multiple(&mut rng, size).copied().collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::data::generate_students;
    use crate::domain::GenerateConfig;

    fn records(n: usize) -> Vec<StudentRecord> {
        generate_students(&GenerateConfig {
            count: n,
            seed: 7,
            output: PathBuf::from("unused.csv"),
        })
        .unwrap()
    }

    #[test]
    fn small_datasets_are_used_whole() {
        let rows = records(40);
        let drawn = draw_background(&rows, BACKGROUND_SIZE, BACKGROUND_SEED);
        assert_eq!(drawn, rows);
    }

    #[test]
    fn draws_distinct_rows_deterministically() {
        let rows = records(300);
        let a = draw_background(&rows, BACKGROUND_SIZE, BACKGROUND_SEED);
        let b = draw_background(&rows, BACKGROUND_SIZE, BACKGROUND_SEED);
        assert_eq!(a.len(), BACKGROUND_SIZE);
        assert_eq!(a, b);

        // Without replacement: every drawn row maps to a distinct source index.
        let mut idx: Vec<usize> = a
            .iter()
            .map(|r| rows.iter().position(|s| s == r).unwrap())
            .collect();
        idx.sort_unstable();
        idx.dedup();
        assert_eq!(idx.len(), BACKGROUND_SIZE);
    }
}
