use thiserror::Error;

use crate::shared::entities::{CallAction, CallCategory, Classification};

const DEFAULT_SCORED_CONFIDENCE: f64 = 0.5;
const DEFAULT_SCORED_RISK: f64 = 0.5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScorerReplyError {
    #[error("scorer reply has no category field")]
    MissingCategory,
}

pub fn build_prompt(transcript: &str) -> String {
    format!(
        r#"Analyze this call transcript and classify it into one of these categories:

Transcript: "{}"

Categories:
- SPAM_ROBOCALL: Automated marketing, scam, or unwanted robocall
- SIM_BLOCKED: Operator message about SIM being blocked or suspended
- VOICEMAIL: Voicemail system or answering machine
- NORMAL_CALL: Regular human conversation
- OPERATOR_IVR: Operator system message (not blocking)
- LOW_CREDIT: Message about insufficient credit or balance

Respond in this exact format, one field per line:
category: [CATEGORY]
confidence: [0.0-1.0]
action: [route_to_ai|flag_sim|normal_routing|block_call|record_for_review]
reason: [Brief explanation]
risk_score: [0.0-1.0]"#,
        transcript.replace('"', "'")
    )
}

/// Reads the `key: value` reply format. Only `category` is mandatory;
/// a missing or unknown action falls back to the category's default.
pub fn parse_scorer_reply(reply: &str) -> Result<Classification, ScorerReplyError> {
    let mut category = None;
    let mut confidence = None;
    let mut action = None;
    let mut reason = None;
    let mut risk_score = None;

    for line in reply.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key
            .trim()
            .trim_matches(|c: char| c == '-' || c == '*' || c.is_whitespace())
            .to_ascii_lowercase();
        let value = value.trim();
        match key.as_str() {
            "category" if category.is_none() => {
                category = first_word(value).map(CallCategory::from_label);
            }
            "confidence" if confidence.is_none() => confidence = leading_number(value),
            "action" if action.is_none() => {
                action = first_word(value).and_then(CallAction::from_label);
            }
            "reason" if reason.is_none() && !value.is_empty() => reason = Some(value.to_string()),
            "risk_score" if risk_score.is_none() => risk_score = leading_number(value),
            _ => {}
        }
    }

    let category = category.ok_or(ScorerReplyError::MissingCategory)?;
    Ok(Classification::new(
        category,
        confidence.unwrap_or(DEFAULT_SCORED_CONFIDENCE),
        action.unwrap_or_else(|| category.default_action()),
        reason.unwrap_or_else(|| "Classified by external scorer".to_string()),
        risk_score.unwrap_or(DEFAULT_SCORED_RISK),
    ))
}

fn first_word(value: &str) -> Option<&str> {
    let start = value.find(|c: char| c.is_alphanumeric() || c == '_')?;
    let rest = &value[start..];
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn leading_number(value: &str) -> Option<f64> {
    let start = value.find(|c: char| c.is_ascii_digit() || c == '.')?;
    let rest = &value[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
