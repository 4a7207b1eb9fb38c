use std::fmt;

use serde::Serialize;

/// Speech-to-text output for one call leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub language: String,
    pub duration_seconds: f64,
    pub confidence: f64,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: "en".to_string(),
            duration_seconds: 0.0,
            confidence: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallCategory {
    SpamRobocall,
    SimBlocked,
    Voicemail,
    NormalCall,
    OperatorIvr,
    LowCredit,
    Unknown,
}

impl CallCategory {
    pub const ALL: [CallCategory; 7] = [
        Self::SpamRobocall,
        Self::SimBlocked,
        Self::Voicemail,
        Self::NormalCall,
        Self::OperatorIvr,
        Self::LowCredit,
        Self::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SpamRobocall => "SPAM_ROBOCALL",
            Self::SimBlocked => "SIM_BLOCKED",
            Self::Voicemail => "VOICEMAIL",
            Self::NormalCall => "NORMAL_CALL",
            Self::OperatorIvr => "OPERATOR_IVR",
            Self::LowCredit => "LOW_CREDIT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses a category label, ignoring case. Unrecognised labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(Self::Unknown)
    }

    /// Action applied when a category arrives without a usable action.
    pub fn default_action(self) -> CallAction {
        match self {
            Self::SpamRobocall => CallAction::RouteToAi,
            Self::SimBlocked | Self::LowCredit => CallAction::FlagSim,
            Self::Voicemail | Self::NormalCall | Self::OperatorIvr => CallAction::NormalRouting,
            Self::Unknown => CallAction::RecordForReview,
        }
    }
}

impl fmt::Display for CallCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallAction {
    RouteToAi,
    FlagSim,
    NormalRouting,
    BlockCall,
    RecordForReview,
}

impl CallAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RouteToAi => "ROUTE_TO_AI",
            Self::FlagSim => "FLAG_SIM",
            Self::NormalRouting => "NORMAL_ROUTING",
            Self::BlockCall => "BLOCK_CALL",
            Self::RecordForReview => "RECORD_FOR_REVIEW",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "ROUTE_TO_AI" => Some(Self::RouteToAi),
            "FLAG_SIM" => Some(Self::FlagSim),
            "NORMAL_ROUTING" => Some(Self::NormalRouting),
            "BLOCK_CALL" => Some(Self::BlockCall),
            "RECORD_FOR_REVIEW" => Some(Self::RecordForReview),
            _ => None,
        }
    }
}

impl fmt::Display for CallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category: CallCategory,
    pub confidence: f64,
    pub action: CallAction,
    pub reason: String,
    pub keywords: Vec<String>,
    pub risk_score: f64,
}

impl Classification {
    pub fn new(
        category: CallCategory,
        confidence: f64,
        action: CallAction,
        reason: impl Into<String>,
        risk_score: f64,
    ) -> Self {
        Self {
            category,
            confidence: confidence.clamp(0.0, 1.0),
            action,
            reason: reason.into(),
            keywords: Vec::new(),
            risk_score: risk_score.clamp(0.0, 1.0),
        }
    }

    /// Fallback used when neither rules nor the external scorer decide.
    pub fn normal_call() -> Self {
        Self::new(
            CallCategory::NormalCall,
            0.5,
            CallAction::NormalRouting,
            "No specific patterns detected",
            0.1,
        )
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }
}
