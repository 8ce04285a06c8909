//! XGBoost-style gradient boosting with second-order approximation
//!
//! Key differences from plain gradient boosting:
//! - Uses both gradient and hessian of the loss
//! - Regularized leaf weights: w* = -G / (H + lambda)
//! - Gain-based split scoring: Gain = 0.5 * [GL²/(HL+λ) + GR²/(HR+λ) - (GL+GR)²/(HL+HR+λ)] - γ
//! - Minimum child weight constraint

use super::models::Regressor;
use crate::error::{Result, SalaryError};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// XGBoost configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XGBoostConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// L1 regularization on leaf weights
    pub reg_alpha: f64,
    /// Minimum loss reduction to make a split (gamma)
    pub gamma: f64,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub random_state: u64,
}

impl Default for XGBoostConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            gamma: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum XGBNode {
    Leaf { weight: f64 },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<XGBNode>,
        right: Box<XGBNode>,
    },
}

impl XGBNode {
    fn predict(&self, sample: ArrayView1<'_, f64>) -> f64 {
        match self {
            XGBNode::Leaf { weight } => *weight,
            XGBNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] <= *threshold {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }
}

/// Gradient statistics shared by the tree builder
struct GradStats<'a> {
    x: &'a Array2<f64>,
    grad: &'a Array1<f64>,
    hess: &'a Array1<f64>,
    config: &'a XGBoostConfig,
}

impl GradStats<'_> {
    /// Exact greedy tree construction
    fn build(&self, indices: &[usize], features: &[usize], depth: usize) -> XGBNode {
        let g_sum: f64 = indices.iter().map(|&i| self.grad[i]).sum();
        let h_sum: f64 = indices.iter().map(|&i| self.hess[i]).sum();
        let weight = leaf_weight(g_sum, h_sum, self.config.reg_lambda, self.config.reg_alpha);

        if depth >= self.config.max_depth
            || indices.len() < 2
            || h_sum < self.config.min_child_weight
        {
            return XGBNode::Leaf { weight };
        }

        let best = features
            .par_iter()
            .filter_map(|&f| self.best_split_for_feature(indices, f, g_sum, h_sum))
            .collect::<Vec<_>>()
            .into_iter()
            .fold(None, |acc: Option<(usize, f64, f64)>, cand| match acc {
                Some(a) if a.2 >= cand.2 => Some(a),
                _ => Some(cand),
            });

        match best {
            Some((feature, threshold, gain)) if gain > self.config.gamma => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| self.x[[i, feature]] <= threshold);

                if left_idx.is_empty() || right_idx.is_empty() {
                    return XGBNode::Leaf { weight };
                }

                XGBNode::Split {
                    feature,
                    threshold,
                    left: Box::new(self.build(&left_idx, features, depth + 1)),
                    right: Box::new(self.build(&right_idx, features, depth + 1)),
                }
            }
            _ => XGBNode::Leaf { weight },
        }
    }

    /// Best (feature, threshold, gain) for one feature
    fn best_split_for_feature(
        &self,
        indices: &[usize],
        feature: usize,
        g_total: f64,
        h_total: f64,
    ) -> Option<(usize, f64, f64)> {
        let x = self.x;
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_by(|&a, &b| {
            x[[a, feature]]
                .partial_cmp(&x[[b, feature]])
                .unwrap_or(Ordering::Equal)
        });

        let lambda = self.config.reg_lambda;
        let parent_score = g_total * g_total / (h_total + lambda);

        let mut g_left = 0.0;
        let mut h_left = 0.0;
        let mut best: Option<(usize, f64, f64)> = None;

        for pos in 0..sorted.len() - 1 {
            let idx = sorted[pos];
            g_left += self.grad[idx];
            h_left += self.hess[idx];

            let current = x[[idx, feature]];
            let next = x[[sorted[pos + 1], feature]];
            if (next - current).abs() < 1e-12 {
                continue;
            }

            let g_right = g_total - g_left;
            let h_right = h_total - h_left;
            if h_left < self.config.min_child_weight || h_right < self.config.min_child_weight {
                continue;
            }

            let gain = 0.5
                * (g_left * g_left / (h_left + lambda) + g_right * g_right / (h_right + lambda)
                    - parent_score);

            if best.map_or(true, |b| gain > b.2) {
                best = Some((feature, (current + next) / 2.0, gain));
            }
        }

        best
    }
}

/// Optimal leaf weight with L1 (alpha) and L2 (lambda) regularization
fn leaf_weight(g_sum: f64, h_sum: f64, lambda: f64, alpha: f64) -> f64 {
    let g_adj = if g_sum > alpha {
        g_sum - alpha
    } else if g_sum < -alpha {
        g_sum + alpha
    } else {
        return 0.0;
    };
    -g_adj / (h_sum + lambda)
}

fn subsample(rng: &mut Xoshiro256PlusPlus, n: usize, ratio: f64) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n).collect();
    }
    let k = ((n as f64) * ratio).ceil().max(1.0) as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(k);
    indices.sort_unstable();
    indices
}

/// XGBoost Regressor (squared error loss)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XGBoostRegressor {
    config: XGBoostConfig,
    trees: Vec<XGBNode>,
    base_score: f64,
    n_features: usize,
}

impl Default for XGBoostRegressor {
    fn default() -> Self {
        Self::new(XGBoostConfig::default())
    }
}

impl XGBoostRegressor {
    pub fn new(config: XGBoostConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
            n_features: 0,
        }
    }

    pub fn config(&self) -> &XGBoostConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn raw_tree_sum(&self, row: ArrayView1<'_, f64>) -> f64 {
        self.trees.iter().map(|tree| tree.predict(row)).sum::<f64>()
    }
}

impl Regressor for XGBoostRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples != y.len() || n_samples == 0 {
            return Err(SalaryError::ShapeError {
                expected: format!("y length = {} (non-zero)", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        self.n_features = n_features;
        self.base_score = y.mean().unwrap_or(0.0);
        self.trees.clear();

        let mut preds = Array1::from_elem(n_samples, self.base_score);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);
        let hess = Array1::from_elem(n_samples, 1.0);

        for _ in 0..self.config.n_estimators {
            // Squared error: grad = pred - y, hess = 1
            let grad: Array1<f64> = &preds - y;

            let rows = subsample(&mut rng, n_samples, self.config.subsample);
            let cols = subsample(&mut rng, n_features, self.config.colsample_bytree);

            let stats = GradStats {
                x,
                grad: &grad,
                hess: &hess,
                config: &self.config,
            };
            let tree = stats.build(&rows, &cols, 0);

            for (i, row) in x.rows().into_iter().enumerate() {
                preds[i] += self.config.learning_rate * tree.predict(row);
            }
            self.trees.push(tree);
        }

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() && self.config.n_estimators > 0 {
            return Err(SalaryError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(SalaryError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x
            .rows()
            .into_iter()
            .map(|row| self.base_score + self.config.learning_rate * self.raw_tree_sum(row))
            .collect())
    }
}
