//! Exact interventional Shapley values for tree ensembles.
//!
//! For a foreground row `x` and one background row `z`, the value of a
//! coalition `S` is `f(x_S, z_{¬S})`. For a single tree this game only depends
//! on the features whose split decisions differ between `x` and `z` along a
//! path, so it can be solved by one traversal:
//!
//! - where `x` and `z` take the same branch, follow it
//! - where they diverge on a feature already fixed to one side, follow that side
//! - otherwise explore both branches, recording the feature in the `x` set
//!   (taking `x`'s branch) or the `z` set (taking `z`'s branch)
//!
//! A leaf reached with `|X| = a` and `|Z| = b` contributes
//! `+v · (a-1)! b! / (a+b)!` to every feature in `X` and
//! `-v · a! (b-1)! / (a+b)!` to every feature in `Z`. Per tree and background
//! row the attributions sum to `f(x) - f(z)`, which gives local accuracy after
//! averaging.

use rayon::prelude::*;

use crate::models::{Node, RandomForest, RegressionTree};

/// Upper bound on features tracked in a coalition bitmask.
pub const MAX_FEATURES: usize = 64;

/// Attributions for one row plus the baseline they are measured from.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapValues {
    /// Mean model output over the background rows.
    pub base_value: f64,
    /// One value per model feature, in model column order.
    pub values: Vec<f64>,
}

/// Shapley values of `forest` at `x` against `background`.
///
/// # Panics
/// Panics if the forest has more than [`MAX_FEATURES`] features, or if `x`
/// or a background row is shorter than the forest's feature count.
pub fn forest_shap(forest: &RandomForest, x: &[f64], background: &[Vec<f64>]) -> ShapValues {
    let m = forest.n_features();
    assert!(
        m <= MAX_FEATURES,
        "too many features for coalition bitmask: {m}"
    );

    if background.is_empty() {
        return ShapValues {
            base_value: forest.predict(x),
            values: vec![0.0; m],
        };
    }

    let weights = ShapleyWeights::new(m);
    let per_tree: Vec<Vec<f64>> = forest
        .trees()
        .par_iter()
        .map(|tree| {
            let mut phi = vec![0.0; m];
            for z in background {
                tree_shap(tree, x, z, &weights, &mut phi);
            }
            phi
        })
        .collect();

    let scale = 1.0 / (forest.trees().len() * background.len()) as f64;
    let mut values = vec![0.0; m];
    for phi in per_tree {
        for (acc, v) in values.iter_mut().zip(phi) {
            *acc += v;
        }
    }
    values.iter_mut().for_each(|v| *v *= scale);

    let total: f64 = background.iter().map(|z| forest.predict(z)).sum();
    let base_value = total / background.len() as f64;

    ShapValues { base_value, values }
}

/// Accumulate one tree's attributions for `x` against a single background row `z`.
pub fn tree_shap(
    tree: &RegressionTree,
    x: &[f64],
    z: &[f64],
    weights: &ShapleyWeights,
    phi: &mut [f64],
) {
    let nodes = tree.nodes();
    if nodes.is_empty() {
        return;
    }
    recurse(nodes, 0, x, z, 0, 0, weights, phi);
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    nodes: &[Node],
    i: usize,
    x: &[f64],
    z: &[f64],
    x_set: u64,
    z_set: u64,
    weights: &ShapleyWeights,
    phi: &mut [f64],
) {
    match &nodes[i] {
        Node::Leaf { value, .. } => {
            let a = x_set.count_ones() as usize;
            let b = z_set.count_ones() as usize;
            if a > 0 {
                let w = value * weights.get(a - 1, b);
                for f in bits(x_set) {
                    phi[f] += w;
                }
            }
            if b > 0 {
                let w = value * weights.get(a, b - 1);
                for f in bits(z_set) {
                    phi[f] -= w;
                }
            }
        }
        Node::Split {
            feature,
            threshold,
            left,
            right,
            ..
        } => {
            let f = *feature;
            let bit = 1u64 << f;
            let x_child = if x[f] <= *threshold { *left } else { *right };
            let z_child = if z[f] <= *threshold { *left } else { *right };

            if x_child == z_child {
                recurse(nodes, x_child, x, z, x_set, z_set, weights, phi);
            } else if x_set & bit != 0 {
                recurse(nodes, x_child, x, z, x_set, z_set, weights, phi);
            } else if z_set & bit != 0 {
                recurse(nodes, z_child, x, z, x_set, z_set, weights, phi);
            } else {
                recurse(nodes, x_child, x, z, x_set | bit, z_set, weights, phi);
                recurse(nodes, z_child, x, z, x_set, z_set | bit, weights, phi);
            }
        }
    }
}

fn bits(mut set: u64) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if set == 0 {
            return None;
        }
        let f = set.trailing_zeros() as usize;
        set &= set - 1;
        Some(f)
    })
}

/// Table of `p! q! / (p + q + 1)!` for `p + q < m`.
#[derive(Debug, Clone)]
pub struct ShapleyWeights {
    m: usize,
    table: Vec<f64>,
}

impl ShapleyWeights {
    pub fn new(m: usize) -> Self {
        let mut fact = vec![1.0_f64; m + 2];
        for k in 1..fact.len() {
            fact[k] = fact[k - 1] * k as f64;
        }
        let mut table = vec![0.0; m * m.max(1)];
        for p in 0..m {
            for q in 0..m - p {
                table[p * m + q] = fact[p] * fact[q] / fact[p + q + 1];
            }
        }
        Self { m, table }
    }

    pub fn get(&self, p: usize, q: usize) -> f64 {
        self.table[p * self.m + q]
    }
}
