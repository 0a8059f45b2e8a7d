//! Per-user course suggestions behind a capability trait.
//!
//! The shipped source is a canned-list lookup with a simulated network delay
//! and a simulated failure rate, used to exercise the loading and error UI
//! states. It is not a recommender. Tests and callers that need determinism
//! inject [`FixedSuggestionSource`] instead.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use edumarket_core::{seed_catalog, Course};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

pub const CRATE_NAME: &str = "edumarket-suggest";

/// The user every unknown id falls back to.
pub const DEFAULT_USER: &str = "user123";

const DEFAULT_DELAY: Duration = Duration::from_millis(1_500);
const DEFAULT_FAILURE_RATE: f64 = 0.1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SuggestError {
    /// The only failure the simulator produces. Always retryable: calls are
    /// independent, a retry succeeds or fails on its own.
    #[error("suggestions temporarily unavailable")]
    TemporarilyUnavailable,
}

impl SuggestError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SuggestError::TemporarilyUnavailable)
    }
}

#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn fetch_suggestions(&self, user_id: &str) -> Result<Vec<Course>, SuggestError>;
}

/// Canned per-user lists with simulated latency and a simulated failure
/// fraction. No shared retry counter or other cross-call state.
pub struct CannedSuggestionSource {
    per_user: HashMap<String, Vec<Course>>,
    delay: Duration,
    failure_rate: f64,
}

impl CannedSuggestionSource {
    /// The stock configuration: two known users over the seeded catalog,
    /// 1.5s of latency, roughly one failure in ten calls.
    pub fn stock() -> Self {
        Self::new(seed_catalog(), DEFAULT_DELAY, DEFAULT_FAILURE_RATE)
    }

    pub fn new(catalog: Vec<Course>, delay: Duration, failure_rate: f64) -> Self {
        let pick = |indexes: &[usize]| -> Vec<Course> {
            indexes
                .iter()
                .filter_map(|&idx| catalog.get(idx).cloned())
                .collect()
        };
        let mut per_user = HashMap::new();
        per_user.insert(DEFAULT_USER.to_string(), pick(&[0, 3, 6]));
        per_user.insert("user456".to_string(), pick(&[1, 4, 7]));
        Self {
            per_user,
            delay,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl SuggestionSource for CannedSuggestionSource {
    async fn fetch_suggestions(&self, user_id: &str) -> Result<Vec<Course>, SuggestError> {
        tokio::time::sleep(self.delay).await;

        if rand::rng().random::<f64>() < self.failure_rate {
            debug!(user_id, "simulated suggestion failure");
            return Err(SuggestError::TemporarilyUnavailable);
        }

        let courses = self
            .per_user
            .get(user_id)
            .or_else(|| self.per_user.get(DEFAULT_USER))
            .cloned()
            .unwrap_or_default();
        Ok(courses)
    }
}

/// Deterministic source for tests: a fixed list or a fixed failure.
pub struct FixedSuggestionSource {
    outcome: Result<Vec<Course>, SuggestError>,
}

impl FixedSuggestionSource {
    pub fn succeeding(courses: Vec<Course>) -> Self {
        Self { outcome: Ok(courses) }
    }

    pub fn failing() -> Self {
        Self {
            outcome: Err(SuggestError::TemporarilyUnavailable),
        }
    }
}

#[async_trait]
impl SuggestionSource for FixedSuggestionSource {
    async fn fetch_suggestions(&self, _user_id: &str) -> Result<Vec<Course>, SuggestError> {
        match &self.outcome {
            Ok(courses) => Ok(courses.clone()),
            Err(_) => Err(SuggestError::TemporarilyUnavailable),
        }
    }
}
