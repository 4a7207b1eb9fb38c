use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one external liveness lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub phone_number: String,
    pub is_live: bool,
    pub confidence: f64,
    pub source: String,
    pub observed_at: DateTime<Utc>,
}

impl ValidationResult {
    pub fn new(
        phone_number: impl Into<String>,
        is_live: bool,
        confidence: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            phone_number: phone_number.into(),
            is_live,
            confidence: confidence.clamp(0.0, 1.0),
            source: source.into(),
            observed_at: Utc::now(),
        }
    }
}
