use thiserror::Error;

use crate::shared::ports::{CallRecordError, HandoffError, SimRegistryError};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("handoff failed for call {call_id}: {source}")]
    Handoff {
        call_id: String,
        #[source]
        source: HandoffError,
    },
    #[error("no SIM registered for call {0}")]
    SimNotFound(String),
    #[error("sim registry failed for call {call_id}: {source}")]
    SimRegistry {
        call_id: String,
        #[source]
        source: SimRegistryError,
    },
    #[error("call record write failed for call {call_id}: {source}")]
    CallRecord {
        call_id: String,
        #[source]
        source: CallRecordError,
    },
}
