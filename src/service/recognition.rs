use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;

use crate::service::classification::CallClassifier;
use crate::service::dispatch::ActionDispatcher;
use crate::shared::entities::{CallAction, CallCategory, CallId, Classification, Transcript};
use crate::shared::error::DispatchError;

/// Recordings below this confidence are kept for human review.
const RETAIN_BELOW_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionOutcome {
    pub call_id: CallId,
    pub classification: Classification,
    pub action_taken: CallAction,
    /// The signaling layer should hang up the call.
    pub should_terminate: bool,
    /// The audio is worth keeping for training or review.
    pub retain_recording: bool,
    pub analyzed_at: DateTime<Utc>,
}

/// Classifies a transcript and dispatches the resulting action.
pub struct RecognitionService {
    classifier: Arc<dyn CallClassifier>,
    dispatcher: Arc<ActionDispatcher>,
}

impl RecognitionService {
    pub fn new(classifier: Arc<dyn CallClassifier>, dispatcher: Arc<ActionDispatcher>) -> Self {
        Self {
            classifier,
            dispatcher,
        }
    }

    pub async fn process(
        &self,
        call_id: &CallId,
        transcript: &Transcript,
    ) -> Result<RecognitionOutcome, DispatchError> {
        let classification = self.classifier.classify(transcript).await;
        self.dispatcher.execute(call_id, &classification).await?;

        let should_terminate = should_terminate(&classification);
        let retain_recording = retain_recording(&classification);
        info!(
            "[RecognitionService] call_id={} category={} action={} terminate={} retain_recording={}",
            call_id,
            classification.category,
            classification.action,
            should_terminate,
            retain_recording
        );
        Ok(RecognitionOutcome {
            call_id: call_id.clone(),
            action_taken: classification.action,
            classification,
            should_terminate,
            retain_recording,
            analyzed_at: Utc::now(),
        })
    }
}

fn should_terminate(classification: &Classification) -> bool {
    matches!(
        classification.category,
        CallCategory::SpamRobocall | CallCategory::SimBlocked
    ) || classification.action == CallAction::BlockCall
}

fn retain_recording(classification: &Classification) -> bool {
    matches!(
        classification.category,
        CallCategory::SpamRobocall | CallCategory::SimBlocked
    ) || classification.confidence < RETAIN_BELOW_CONFIDENCE
}
