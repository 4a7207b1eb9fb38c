use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("scoring request failed: {0}")]
    RequestFailed(String),
    #[error("scorer returned status {status}: {body}")]
    BadStatus { status: u16, body: String },
    #[error("scorer timed out after {0}ms")]
    Timeout(u64),
    #[error("scorer reply unparseable: {0}")]
    Unparseable(String),
}

pub type ScorerFuture = Pin<Box<dyn Future<Output = Result<String, ScorerError>> + Send>>;

/// External model that answers a classification prompt with the
/// line-oriented `key: value` reply format.
pub trait ScorerPort: Send + Sync {
    fn score(&self, prompt: String) -> ScorerFuture;
}
