pub mod classifier;
pub mod rules;
pub mod scorer_protocol;

pub use classifier::{CallClassifier, ClassifyFuture, TranscriptClassifier};
pub use rules::{extract_keywords, ClassificationRule, RuleSet};
pub use scorer_protocol::{build_prompt, parse_scorer_reply, ScorerReplyError};
