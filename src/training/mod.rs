//! Model training module
//!
//! Five candidate regressors are fitted on the same seeded split and the one
//! with the best held-out R² is kept:
//! - Linear and Ridge regression
//! - Random Forest
//! - Gradient boosting
//! - XGBoost-style second-order boosting

mod config;
mod engine;
mod models;
mod split;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod linear_models;
pub mod random_forest;
pub mod xgboost;

pub use config::{ModelType, TrainingConfig};
pub use decision_tree::{DecisionTree, TreeNode};
pub use engine::{
    select_best, CandidateResult, TrainEngine, TrainedModel, TrainingOutcome, TrainingReport,
};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use linear_models::{LinearRegression, RidgeRegression};
pub use models::{RegressionMetrics, Regressor};
pub use random_forest::RandomForest;
pub use split::{train_test_split, TrainTestSplit};
pub use xgboost::{XGBoostConfig, XGBoostRegressor};
