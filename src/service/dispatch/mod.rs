use std::sync::Arc;

use log::{info, warn};

use crate::shared::entities::{
    AuditEntry, CallAction, CallId, Classification, ReplacementPriority, ReviewRecord, SimFlag,
};
use crate::shared::error::DispatchError;
use crate::shared::ports::{AssistedHandlingPort, CallRecordPort, SimRegistryPort};

/// Reason text that escalates a SIM flag to an urgent replacement.
const OPERATOR_BLOCK_MARKER: &str = "blocked by operator";

/// Carries out the side effect chosen by a classification.
pub struct ActionDispatcher {
    handoff: Arc<dyn AssistedHandlingPort>,
    sims: Arc<dyn SimRegistryPort>,
    records: Arc<dyn CallRecordPort>,
}

impl ActionDispatcher {
    pub fn new(
        handoff: Arc<dyn AssistedHandlingPort>,
        sims: Arc<dyn SimRegistryPort>,
        records: Arc<dyn CallRecordPort>,
    ) -> Self {
        Self {
            handoff,
            sims,
            records,
        }
    }

    /// Appends the audit entry, then runs the branch for
    /// `classification.action`. Audit failures are logged and do not stop
    /// the branch.
    pub async fn execute(
        &self,
        call_id: &CallId,
        classification: &Classification,
    ) -> Result<(), DispatchError> {
        info!(
            "[ActionDispatcher] call_id={} category={} action={} confidence={:.2}",
            call_id, classification.category, classification.action, classification.confidence
        );

        let entry = AuditEntry::from_classification(call_id.clone(), classification);
        if let Err(err) = self.records.append_audit_log(entry).await {
            warn!(
                "[ActionDispatcher] call_id={} audit log write failed: {}",
                call_id, err
            );
        }

        match classification.action {
            CallAction::RouteToAi => self.route_to_agent(call_id, &classification.reason).await,
            CallAction::FlagSim => self.flag_sim(call_id, &classification.reason).await,
            CallAction::BlockCall => self.block_call(call_id, &classification.reason).await,
            CallAction::RecordForReview => self.record_for_review(call_id, classification).await,
            CallAction::NormalRouting => {
                info!(
                    "[ActionDispatcher] call_id={} normal routing, nothing to do",
                    call_id
                );
                Ok(())
            }
        }
    }

    async fn route_to_agent(&self, call_id: &CallId, reason: &str) -> Result<(), DispatchError> {
        self.handoff
            .hand_off(call_id, reason)
            .await
            .map_err(|source| DispatchError::Handoff {
                call_id: call_id.to_string(),
                source,
            })?;
        info!("[ActionDispatcher] call_id={} handed off to agent", call_id);

        if let Err(err) = self.records.mark_routed_to_agent(call_id).await {
            warn!(
                "[ActionDispatcher] call_id={} failed to mark call as routed: {}",
                call_id, err
            );
        }
        Ok(())
    }

    async fn flag_sim(&self, call_id: &CallId, reason: &str) -> Result<(), DispatchError> {
        let sim_id = self
            .sims
            .sim_for_call(call_id)
            .await
            .map_err(|source| DispatchError::SimRegistry {
                call_id: call_id.to_string(),
                source,
            })?
            .ok_or_else(|| DispatchError::SimNotFound(call_id.to_string()))?;

        self.sims
            .flag_sim(SimFlag::new(sim_id.clone(), reason))
            .await
            .map_err(|source| DispatchError::SimRegistry {
                call_id: call_id.to_string(),
                source,
            })?;
        info!(
            "[ActionDispatcher] call_id={} sim_id={} flagged issue={}",
            call_id, sim_id, reason
        );

        if reason.to_ascii_lowercase().contains(OPERATOR_BLOCK_MARKER) {
            match self
                .sims
                .schedule_replacement(&sim_id, ReplacementPriority::High)
                .await
            {
                Ok(()) => info!(
                    "[ActionDispatcher] call_id={} sim_id={} replacement scheduled priority=high",
                    call_id, sim_id
                ),
                Err(err) => warn!(
                    "[ActionDispatcher] call_id={} sim_id={} replacement scheduling failed: {}",
                    call_id, sim_id, err
                ),
            }
        }
        Ok(())
    }

    async fn block_call(&self, call_id: &CallId, reason: &str) -> Result<(), DispatchError> {
        self.records
            .record_block(call_id, reason)
            .await
            .map_err(|source| DispatchError::CallRecord {
                call_id: call_id.to_string(),
                source,
            })?;
        info!("[ActionDispatcher] call_id={} blocked reason={}", call_id, reason);
        Ok(())
    }

    async fn record_for_review(
        &self,
        call_id: &CallId,
        classification: &Classification,
    ) -> Result<(), DispatchError> {
        let record = ReviewRecord::from_classification(call_id.clone(), classification);
        self.records
            .record_review(record)
            .await
            .map_err(|source| DispatchError::CallRecord {
                call_id: call_id.to_string(),
                source,
            })?;
        info!("[ActionDispatcher] call_id={} queued for manual review", call_id);
        Ok(())
    }
}
