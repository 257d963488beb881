//! CART regression tree (squared-error criterion).
//!
//! Trees are stored as a flat node array in pre-order: the root is node `0`
//! and every child index is greater than its parent's. Rows go left when
//! `x[feature] <= threshold`.

use serde::{Deserialize, Serialize};

use crate::domain::TreeParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
    },
    Leaf {
        value: f64,
        n_samples: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    n_features: usize,
    nodes: Vec<Node>,
}

/// A fitted tree plus its unnormalized impurity decrease per feature.
#[derive(Debug, Clone)]
pub struct TreeFit {
    pub tree: RegressionTree,
    pub impurity_decrease: Vec<f64>,
}

impl RegressionTree {
    /// Fit a tree on the rows listed in `sample` (duplicates allowed, as
    /// produced by bootstrap resampling).
    ///
    /// `x` is row-major; every row must have the same length.
    pub fn fit(x: &[Vec<f64>], y: &[f64], sample: &[usize], params: &TreeParams) -> TreeFit {
        let n_features = x.first().map(Vec::len).unwrap_or(0);
        let mut builder = Builder {
            x,
            y,
            params,
            nodes: Vec::new(),
            impurity_decrease: vec![0.0; n_features],
        };
        let mut idx = sample.to_vec();
        builder.build(&mut idx, 0);

        TreeFit {
            tree: RegressionTree {
                n_features,
                nodes: builder.nodes,
            },
            impurity_decrease: builder.impurity_decrease,
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    i = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], i: usize) -> usize {
            match &nodes[i] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Check structural invariants of a deserialized tree.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        if self.n_features != n_features {
            return Err(format!(
                "tree expects {} features, artifact lists {n_features}",
                self.n_features
            ));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { value, .. } => {
                    if !value.is_finite() {
                        return Err(format!("node {i}: non-finite leaf value"));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {i}: feature index {feature} out of range"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i}: non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i}: invalid child index {child}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: &'a TreeParams,
    nodes: Vec<Node>,
    impurity_decrease: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    /// `Σ_left y² / n_left + Σ_right y² / n_right` (higher is better).
    score: f64,
}

impl Builder<'_> {
    fn build(&mut self, idx: &mut [usize], depth: usize) -> usize {
        let n = idx.len();
        let (sum, sum_sq) = idx.iter().fold((0.0, 0.0), |(s, q), &i| {
            let v = self.y[i];
            (s + v, q + v * v)
        });
        let mean = if n > 0 { sum / n as f64 } else { 0.0 };
        let sse = (sum_sq - sum * mean).max(0.0);

        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: mean,
            n_samples: n,
        });

        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        let too_small = n < self.params.min_samples_split.max(2);
        if depth_reached || too_small || self.is_pure(idx) {
            return node_id;
        }

        let Some(split) = self.best_split(idx, sum) else {
            return node_id;
        };

        // Partition in place: rows with x <= threshold first.
        let mut n_left = 0;
        for k in 0..n {
            if self.x[idx[k]][split.feature] <= split.threshold {
                idx.swap(k, n_left);
                n_left += 1;
            }
        }
        let children_sse = self.sse_of(&idx[..n_left]) + self.sse_of(&idx[n_left..]);
        self.impurity_decrease[split.feature] += (sse - children_sse).max(0.0);

        let (left_idx, right_idx) = idx.split_at_mut(n_left);
        let left = self.build(left_idx, depth + 1);
        let right = self.build(right_idx, depth + 1);

        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            n_samples: n,
        };
        node_id
    }

    fn best_split(&self, idx: &[usize], total: f64) -> Option<Split> {
        let n = idx.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let n_features = self.impurity_decrease.len();
        let mut best: Option<Split> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in 0..n_features {
            pairs.clear();
            pairs.extend(idx.iter().map(|&i| (self.x[i][feature], self.y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for k in 0..n - 1 {
                left_sum += pairs[k].1;
                let n_left = k + 1;
                let n_right = n - n_left;
                if pairs[k + 1].0 <= pairs[k].0 || n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                let right_sum = total - left_sum;
                let score = left_sum * left_sum / n_left as f64
                    + right_sum * right_sum / n_right as f64;
                if best.is_none_or(|b| score > b.score) {
                    let (lo, hi) = (pairs[k].0, pairs[k + 1].0);
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        score,
                    });
                }
            }
        }

        best
    }

    /// Every label in the node is identical.
    fn is_pure(&self, idx: &[usize]) -> bool {
        match idx.first() {
            Some(&first) => idx.iter().all(|&i| self.y[i] == self.y[first]),
            None => true,
        }
    }

    fn sse_of(&self, idx: &[usize]) -> f64 {
        if idx.is_empty() {
            return 0.0;
        }
        let n = idx.len() as f64;
        let mean = idx.iter().map(|&i| self.y[i]).sum::<f64>() / n;
        idx.iter().map(|&i| (self.y[i] - mean).powi(2)).sum()
    }
}
