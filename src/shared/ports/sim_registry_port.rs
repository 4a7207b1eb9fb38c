use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::shared::entities::{CallId, ReplacementPriority, SimFlag, SimId};

#[derive(Debug, Error)]
pub enum SimRegistryError {
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
}

pub type SimRegistryFuture<T> = Pin<Box<dyn Future<Output = Result<T, SimRegistryError>> + Send>>;

pub trait SimRegistryPort: Send + Sync {
    /// SIM that carried the given call, if known.
    fn sim_for_call(&self, call_id: &CallId) -> SimRegistryFuture<Option<SimId>>;
    fn flag_sim(&self, flag: SimFlag) -> SimRegistryFuture<()>;
    fn schedule_replacement(
        &self,
        sim_id: &SimId,
        priority: ReplacementPriority,
    ) -> SimRegistryFuture<()>;
}

#[derive(Debug, Default)]
pub struct NoopSimRegistry;

impl NoopSimRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl SimRegistryPort for NoopSimRegistry {
    fn sim_for_call(&self, _call_id: &CallId) -> SimRegistryFuture<Option<SimId>> {
        Box::pin(async { Ok(None) })
    }

    fn flag_sim(&self, _flag: SimFlag) -> SimRegistryFuture<()> {
        Box::pin(async { Ok(()) })
    }

    fn schedule_replacement(
        &self,
        _sim_id: &SimId,
        _priority: ReplacementPriority,
    ) -> SimRegistryFuture<()> {
        Box::pin(async { Ok(()) })
    }
}
