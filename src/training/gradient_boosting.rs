//! Gradient boosted regression trees (squared loss)
//!
//! Each round fits a shallow regression tree to the current residuals and
//! adds its shrunken output to the running prediction.

use super::decision_tree::DecisionTree;
use super::models::Regressor;
use crate::error::{Result, SalaryError};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Gradient Boosting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Row subsample ratio for each tree
    pub subsample: f64,
    /// Column subsample ratio for each tree
    pub colsample_bytree: f64,
    /// Random seed
    pub random_state: u64,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: 42,
        }
    }
}

/// Gradient Boosting Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    config: GradientBoostingConfig,
    trees: Vec<DecisionTree>,
    col_indices_per_tree: Vec<Vec<usize>>,
    initial_prediction: f64,
    n_features: usize,
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self::new(GradientBoostingConfig::default())
    }
}

impl GradientBoostingRegressor {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            col_indices_per_tree: Vec::new(),
            initial_prediction: 0.0,
            n_features: 0,
        }
    }

    pub fn config(&self) -> &GradientBoostingConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn sample_indices(n: usize, ratio: f64, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        if ratio >= 1.0 {
            return (0..n).collect();
        }
        let sample_size = ((n as f64) * ratio).ceil().max(1.0) as usize;
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);
        indices.truncate(sample_size);
        indices.sort_unstable();
        indices
    }
}

impl Regressor for GradientBoostingRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() || n_samples == 0 {
            return Err(SalaryError::ShapeError {
                expected: format!("y length = {} (non-zero)", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if !(0.0..=1.0).contains(&self.config.subsample) || self.config.subsample == 0.0 {
            return Err(SalaryError::ConfigError(format!(
                "subsample must be in (0, 1], got {}",
                self.config.subsample
            )));
        }

        self.n_features = n_features;
        self.initial_prediction = y.mean().unwrap_or(0.0);
        self.trees.clear();
        self.col_indices_per_tree.clear();

        let mut predictions = Array1::from_elem(n_samples, self.initial_prediction);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);

        for _ in 0..self.config.n_estimators {
            let residuals: Array1<f64> = y - &predictions;

            let rows = Self::sample_indices(n_samples, self.config.subsample, &mut rng);
            let cols = Self::sample_indices(n_features, self.config.colsample_bytree, &mut rng);

            let x_sub = x.select(Axis(0), &rows).select(Axis(1), &cols);
            let r_sub: Array1<f64> = rows.iter().map(|&i| residuals[i]).collect();

            let mut tree = DecisionTree::new()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf);
            tree.fit(&x_sub, &r_sub)?;

            // Every row moves, including the ones left out of this round's sample
            let update = tree.predict(&x.select(Axis(1), &cols))?;
            predictions.scaled_add(self.config.learning_rate, &update);

            self.trees.push(tree);
            self.col_indices_per_tree.push(cols);
        }

        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(SalaryError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(SalaryError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut predictions = Array1::from_elem(x.nrows(), self.initial_prediction);
        for (tree, cols) in self.trees.iter().zip(&self.col_indices_per_tree) {
            let update = tree.predict(&x.select(Axis(1), cols))?;
            predictions.scaled_add(self.config.learning_rate, &update);
        }
        Ok(predictions)
    }
}
