use std::sync::{Arc, Mutex};

use call_gateway_core::classification::TranscriptClassifier;
use call_gateway_core::config::ClassifierConfig;
use call_gateway_core::dispatch::ActionDispatcher;
use call_gateway_core::entities::{
    AuditEntry, CallAction, CallCategory, CallId, ReplacementPriority, ReviewRecord, SimFlag,
    SimId, Transcript,
};
use call_gateway_core::ports::{
    AssistedHandlingPort, CallRecordFuture, CallRecordPort, HandoffFuture, SimRegistryFuture,
    SimRegistryPort,
};
use call_gateway_core::recognition::RecognitionService;

#[derive(Default)]
struct Ledger {
    audit: Mutex<Vec<AuditEntry>>,
    blocked: Mutex<Vec<String>>,
    routed: Mutex<Vec<String>>,
    flags: Mutex<Vec<SimFlag>>,
    replacements: Mutex<Vec<(String, ReplacementPriority)>>,
    handoffs: Mutex<Vec<String>>,
}

struct Store(Arc<Ledger>);

impl CallRecordPort for Store {
    fn record_block(&self, call_id: &CallId, _reason: &str) -> CallRecordFuture<()> {
        self.0.blocked.lock().unwrap().push(call_id.to_string());
        Box::pin(async { Ok(()) })
    }

    fn record_review(&self, _record: ReviewRecord) -> CallRecordFuture<()> {
        Box::pin(async { Ok(()) })
    }

    fn append_audit_log(&self, entry: AuditEntry) -> CallRecordFuture<()> {
        self.0.audit.lock().unwrap().push(entry);
        Box::pin(async { Ok(()) })
    }

    fn mark_routed_to_agent(&self, call_id: &CallId) -> CallRecordFuture<()> {
        self.0.routed.lock().unwrap().push(call_id.to_string());
        Box::pin(async { Ok(()) })
    }
}

impl SimRegistryPort for Store {
    fn sim_for_call(&self, call_id: &CallId) -> SimRegistryFuture<Option<SimId>> {
        let sim = SimId::new(format!("sim-{}", call_id));
        Box::pin(async move { Ok(Some(sim)) })
    }

    fn flag_sim(&self, flag: SimFlag) -> SimRegistryFuture<()> {
        self.0.flags.lock().unwrap().push(flag);
        Box::pin(async { Ok(()) })
    }

    fn schedule_replacement(
        &self,
        sim_id: &SimId,
        priority: ReplacementPriority,
    ) -> SimRegistryFuture<()> {
        self.0
            .replacements
            .lock()
            .unwrap()
            .push((sim_id.to_string(), priority));
        Box::pin(async { Ok(()) })
    }
}

impl AssistedHandlingPort for Store {
    fn hand_off(&self, call_id: &CallId, _reason: &str) -> HandoffFuture {
        self.0.handoffs.lock().unwrap().push(call_id.to_string());
        Box::pin(async { Ok(()) })
    }
}

fn service() -> (RecognitionService, Arc<Ledger>) {
    let ledger = Arc::new(Ledger::default());
    let dispatcher = ActionDispatcher::new(
        Arc::new(Store(Arc::clone(&ledger))),
        Arc::new(Store(Arc::clone(&ledger))),
        Arc::new(Store(Arc::clone(&ledger))),
    );
    let classifier =
        TranscriptClassifier::new(&ClassifierConfig::default()).expect("builtin rules compile");
    (
        RecognitionService::new(Arc::new(classifier), Arc::new(dispatcher)),
        ledger,
    )
}

#[tokio::test]
async fn operator_block_flags_sim_and_schedules_urgent_replacement() {
    let (service, ledger) = service();
    let call_id = CallId::new("call-1").unwrap();

    let outcome = service
        .process(
            &call_id,
            &Transcript::new("Your SIM card has been blocked by operator"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.classification.category, CallCategory::SimBlocked);
    assert_eq!(outcome.action_taken, CallAction::FlagSim);
    assert!(outcome.should_terminate);
    assert!(outcome.retain_recording);

    let flags = ledger.flags.lock().unwrap();
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].sim_id.as_str(), "sim-call-1");
    assert_eq!(
        *ledger.replacements.lock().unwrap(),
        vec![("sim-call-1".to_string(), ReplacementPriority::High)]
    );
    assert_eq!(ledger.audit.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn sim_rule_outranks_spam_keywords() {
    let (service, ledger) = service();
    let call_id = CallId::new("call-2").unwrap();

    let outcome = service
        .process(
            &call_id,
            &Transcript::new(
                "Congratulations, urgent offer on a loan. Your SIM has been blocked, press 1",
            ),
        )
        .await
        .unwrap();

    assert_eq!(outcome.classification.category, CallCategory::SimBlocked);
    assert!(outcome
        .classification
        .keywords
        .contains(&"congratulations".to_string()));
    assert!(ledger.handoffs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn suspended_line_is_flagged_without_replacement() {
    let (service, ledger) = service();
    let call_id = CallId::new("call-3").unwrap();

    let outcome = service
        .process(&call_id, &Transcript::new("This line has been suspended"))
        .await
        .unwrap();

    assert_eq!(outcome.action_taken, CallAction::FlagSim);
    assert_eq!(ledger.flags.lock().unwrap().len(), 1);
    assert!(ledger.replacements.lock().unwrap().is_empty());
}

#[tokio::test]
async fn robocall_is_handed_to_an_agent() {
    let (service, ledger) = service();
    let call_id = CallId::new("call-4").unwrap();

    let outcome = service
        .process(
            &call_id,
            &Transcript::new("This is an automated message, press 1 to continue"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.classification.category, CallCategory::SpamRobocall);
    assert!(outcome.should_terminate);
    assert_eq!(*ledger.handoffs.lock().unwrap(), vec!["call-4".to_string()]);
    assert_eq!(*ledger.routed.lock().unwrap(), vec!["call-4".to_string()]);
    assert!(ledger.blocked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn voicemail_routes_normally() {
    let (service, ledger) = service();
    let call_id = CallId::new("call-5").unwrap();

    let outcome = service
        .process(
            &call_id,
            &Transcript::new("Please leave a message after the tone"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.action_taken, CallAction::NormalRouting);
    assert!(!outcome.should_terminate);
    assert!(!outcome.retain_recording);
    assert_eq!(ledger.audit.lock().unwrap()[0].category, "VOICEMAIL");
}
