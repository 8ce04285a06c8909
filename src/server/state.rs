//! Application state shared across handlers

use super::ServerConfig;
use crate::inference::Predictor;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Immutable after start-up; handlers only read from it
pub struct AppState {
    pub config: ServerConfig,
    pub predictor: Arc<Predictor>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, predictor: Arc<Predictor>) -> Self {
        Self {
            config,
            predictor,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}
