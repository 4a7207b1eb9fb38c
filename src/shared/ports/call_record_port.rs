use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::shared::entities::{AuditEntry, CallId, ReviewRecord};

#[derive(Debug, Error)]
pub enum CallRecordError {
    #[error("write failed: {0}")]
    WriteFailed(String),
}

pub type CallRecordFuture<T> = Pin<Box<dyn Future<Output = Result<T, CallRecordError>> + Send>>;

pub trait CallRecordPort: Send + Sync {
    fn record_block(&self, call_id: &CallId, reason: &str) -> CallRecordFuture<()>;
    fn record_review(&self, record: ReviewRecord) -> CallRecordFuture<()>;
    fn append_audit_log(&self, entry: AuditEntry) -> CallRecordFuture<()>;
    fn mark_routed_to_agent(&self, call_id: &CallId) -> CallRecordFuture<()>;
}

#[derive(Debug, Default)]
pub struct NoopCallRecord;

impl NoopCallRecord {
    pub fn new() -> Self {
        Self
    }
}

impl CallRecordPort for NoopCallRecord {
    fn record_block(&self, _call_id: &CallId, _reason: &str) -> CallRecordFuture<()> {
        Box::pin(async { Ok(()) })
    }

    fn record_review(&self, _record: ReviewRecord) -> CallRecordFuture<()> {
        Box::pin(async { Ok(()) })
    }

    fn append_audit_log(&self, _entry: AuditEntry) -> CallRecordFuture<()> {
        Box::pin(async { Ok(()) })
    }

    fn mark_routed_to_agent(&self, _call_id: &CallId) -> CallRecordFuture<()> {
        Box::pin(async { Ok(()) })
    }
}
