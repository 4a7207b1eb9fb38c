use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use super::rules::{extract_keywords, RuleSet};
use super::scorer_protocol::{build_prompt, parse_scorer_reply};
use crate::shared::config::ClassifierConfig;
use crate::shared::entities::{Classification, Transcript};
use crate::shared::ports::ScorerPort;

pub type ClassifyFuture<'a> = Pin<Box<dyn Future<Output = Classification> + Send + 'a>>;

/// Maps a transcript to a classification. Never fails: every dependency
/// problem resolves to a fallback classification.
pub trait CallClassifier: Send + Sync {
    fn classify<'a>(&'a self, transcript: &'a Transcript) -> ClassifyFuture<'a>;
}

/// Two-tier classifier: ordered pattern rules first, then the optional
/// external scorer when no rule reaches the confidence threshold.
pub struct TranscriptClassifier {
    rules: RuleSet,
    scorer: Option<Arc<dyn ScorerPort>>,
    threshold: f64,
    scorer_timeout: Duration,
}

impl TranscriptClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            rules: RuleSet::builtin()?,
            scorer: None,
            threshold: config.confidence_threshold,
            scorer_timeout: config.scorer_timeout,
        })
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn ScorerPort>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Rule tier only. Pure and synchronous.
    pub fn classify_with_rules(&self, transcript: &Transcript) -> Option<Classification> {
        self.rules
            .candidate(&transcript.text)
            .map(|candidate| candidate.with_keywords(extract_keywords(&transcript.text)))
    }

    pub async fn classify_transcript(&self, transcript: &Transcript) -> Classification {
        if transcript.text.trim().is_empty() {
            return Classification::normal_call();
        }
        let keywords = extract_keywords(&transcript.text);

        let candidate = self.rules.candidate(&transcript.text);
        if let Some(hit) = candidate.as_ref() {
            if hit.confidence >= self.threshold {
                info!(
                    "[TranscriptClassifier] rule decided category={} confidence={:.2}",
                    hit.category, hit.confidence
                );
                return hit.clone().with_keywords(keywords);
            }
        }

        let fallback = candidate.unwrap_or_else(Classification::normal_call);
        let Some(scorer) = self.scorer.as_ref() else {
            return fallback.with_keywords(keywords);
        };

        let prompt = build_prompt(&transcript.text);
        let reply = match tokio::time::timeout(self.scorer_timeout, scorer.score(prompt)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                warn!(
                    "[TranscriptClassifier] scorer failed, using rule result category={}: {}",
                    fallback.category, err
                );
                return fallback.with_keywords(keywords);
            }
            Err(_) => {
                warn!(
                    "[TranscriptClassifier] scorer timed out after {}ms, using rule result category={}",
                    self.scorer_timeout.as_millis(),
                    fallback.category
                );
                return fallback.with_keywords(keywords);
            }
        };

        match parse_scorer_reply(&reply) {
            Ok(scored) => {
                info!(
                    "[TranscriptClassifier] scorer decided category={} confidence={:.2} action={}",
                    scored.category, scored.confidence, scored.action
                );
                scored.with_keywords(keywords)
            }
            Err(err) => {
                warn!(
                    "[TranscriptClassifier] scorer reply unusable, using rule result category={}: {}",
                    fallback.category, err
                );
                fallback.with_keywords(keywords)
            }
        }
    }
}

impl CallClassifier for TranscriptClassifier {
    fn classify<'a>(&'a self, transcript: &'a Transcript) -> ClassifyFuture<'a> {
        Box::pin(self.classify_transcript(transcript))
    }
}
