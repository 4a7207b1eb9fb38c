use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::shared::entities::CallId;

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("no assisted-handling agent available")]
    NoAgentAvailable,
    #[error("handoff failed: {0}")]
    Failed(String),
}

pub type HandoffFuture = Pin<Box<dyn Future<Output = Result<(), HandoffError>> + Send>>;

/// Queue of automated agents that take over suspicious calls.
pub trait AssistedHandlingPort: Send + Sync {
    fn hand_off(&self, call_id: &CallId, reason: &str) -> HandoffFuture;
}

/// Fixed list of agent endpoints; hands every call to the first one.
#[derive(Debug, Clone, Default)]
pub struct StaticAgentPool {
    endpoints: Vec<String>,
}

impl StaticAgentPool {
    pub fn new<I, S>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoints: endpoints
                .into_iter()
                .map(Into::into)
                .filter(|endpoint: &String| !endpoint.trim().is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl AssistedHandlingPort for StaticAgentPool {
    fn hand_off(&self, call_id: &CallId, reason: &str) -> HandoffFuture {
        let result = match self.endpoints.first() {
            Some(endpoint) => {
                log::info!(
                    "[StaticAgentPool] call_id={} handed to agent={} reason={}",
                    call_id,
                    endpoint,
                    reason
                );
                Ok(())
            }
            None => Err(HandoffError::NoAgentAvailable),
        };
        Box::pin(async move { result })
    }
}
