use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Raw answer from the external reachability service.
#[derive(Clone, Debug, PartialEq)]
pub struct LivenessReply {
    pub is_live: bool,
    pub confidence: f64,
    pub source: String,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LivenessError {
    #[error("liveness request failed: {0}")]
    RequestFailed(String),
    #[error("liveness service returned status {status}: {body}")]
    BadStatus { status: u16, body: String },
    #[error("liveness reply could not be decoded: {0}")]
    Decode(String),
    #[error("liveness check timed out after {0}ms")]
    Timeout(u64),
    #[error("number has no digits to check: {0}")]
    InvalidNumber(String),
    #[error("liveness service not configured")]
    NotConfigured,
}

pub type LivenessFuture = Pin<Box<dyn Future<Output = Result<LivenessReply, LivenessError>> + Send>>;

pub trait LivenessPort: Send + Sync {
    fn check(&self, number: String) -> LivenessFuture;
}
