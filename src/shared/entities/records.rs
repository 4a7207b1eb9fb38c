use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::classification::{CallCategory, Classification};
use super::identifiers::{CallId, SimId};

/// Issue recorded against a SIM card.
#[derive(Debug, Clone, PartialEq)]
pub struct SimFlag {
    pub sim_id: SimId,
    pub issue: String,
    pub flagged_at: DateTime<Utc>,
}

impl SimFlag {
    pub fn new(sim_id: SimId, issue: impl Into<String>) -> Self {
        Self {
            sim_id,
            issue: issue.into(),
            flagged_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementPriority {
    Normal,
    High,
}

impl ReplacementPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

/// Pending manual review of a classified call.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub call_id: CallId,
    pub category: CallCategory,
    pub confidence: f64,
    pub reason: String,
    pub risk_score: f64,
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn from_classification(call_id: CallId, classification: &Classification) -> Self {
        Self {
            id: Uuid::now_v7(),
            call_id,
            category: classification.category,
            confidence: classification.confidence,
            reason: classification.reason.clone(),
            risk_score: classification.risk_score,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub id: Uuid,
    pub call_id: CallId,
    pub category: String,
    pub action: String,
    pub confidence: f64,
    pub reason: String,
    pub risk_score: f64,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn from_classification(call_id: CallId, classification: &Classification) -> Self {
        Self {
            id: Uuid::now_v7(),
            call_id,
            category: classification.category.as_str().to_string(),
            action: classification.action.as_str().to_string(),
            confidence: classification.confidence,
            reason: classification.reason.clone(),
            risk_score: classification.risk_score,
            keywords: classification.keywords.clone(),
            created_at: Utc::now(),
        }
    }
}
