//! Prediction over loaded artifacts
//!
//! A [`Predictor`] is built once from the saved model and encoders and is
//! immutable afterwards, so it can be shared across requests behind an `Arc`.

mod engine;
mod format;

pub use engine::{Predictor, PREDICTIONS_FILE_NAME};
pub use format::format_currency;
