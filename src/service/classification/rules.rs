use regex::Regex;

use crate::shared::entities::{CallAction, CallCategory, Classification};

pub const SPAM_KEYWORDS: &[&str] = &[
    "congratulations",
    "win",
    "prize",
    "urgent",
    "act now",
    "limited time",
    "offer",
    "discount",
    "warranty",
    "insurance",
    "loan",
    "credit",
    "debt",
    "irs",
    "tax",
    "legal action",
    "press 1",
    "press 2",
    "automated message",
    "this is a recording",
];

pub const OPERATOR_PHRASES: &[&str] = &[
    "sim card blocked",
    "sim blocked",
    "line suspended",
    "insufficient credit",
    "low balance",
    "recharge required",
    "your number has been",
    "service suspended",
    "payment required",
    "voicemail",
    "leave a message",
    "mailbox",
];

/// Spam keyword hits needed before keyword density alone yields a candidate.
const SPAM_KEYWORD_MIN_HITS: usize = 3;

pub struct ClassificationRule {
    pub name: &'static str,
    pattern: Regex,
    pub category: CallCategory,
    pub action: CallAction,
    pub confidence: f64,
    pub reason: &'static str,
    pub risk_score: f64,
}

impl ClassificationRule {
    fn new(
        name: &'static str,
        pattern: &str,
        category: CallCategory,
        action: CallAction,
        confidence: f64,
        reason: &'static str,
        risk_score: f64,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            category,
            action,
            confidence,
            reason,
            risk_score,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn to_classification(&self) -> Classification {
        Classification::new(
            self.category,
            self.confidence,
            self.action,
            self.reason,
            self.risk_score,
        )
    }
}

/// Ordered rules; the first match wins. Operator rules sit ahead of the
/// generic automated-call rule because they are more specific.
pub struct RuleSet {
    rules: Vec<ClassificationRule>,
}

impl RuleSet {
    pub fn builtin() -> Result<Self, regex::Error> {
        use CallAction::*;
        use CallCategory::*;

        let rules = vec![
            ClassificationRule::new(
                "sim_blocked",
                r"(?i)(sim.*(blocked|deactivated)|number.*(blocked|deactivated))",
                SimBlocked,
                FlagSim,
                0.95,
                "SIM card blocked by operator",
                0.8,
            )?,
            ClassificationRule::new(
                "line_suspended",
                r"(?i)(line.*suspended|sim.*suspended|number.*suspended|service.*(suspended|terminated))",
                SimBlocked,
                FlagSim,
                0.9,
                "Line suspended by operator",
                0.7,
            )?,
            ClassificationRule::new(
                "low_credit",
                r"(?i)(insufficient.*(credit|balance|funds)|low.*balance|recharge.*required|top.?up.*(required|now))",
                LowCredit,
                FlagSim,
                0.9,
                "Low credit detected",
                0.4,
            )?,
            ClassificationRule::new(
                "automated_call",
                r"(?i)(press.*\d|automated.*message|this.*is.*recording)",
                SpamRobocall,
                RouteToAi,
                0.85,
                "Automated call pattern detected",
                0.9,
            )?,
            ClassificationRule::new(
                "voicemail",
                r"(?i)(voicemail|leave.*message|mailbox)",
                Voicemail,
                NormalRouting,
                0.9,
                "Voicemail system detected",
                0.1,
            )?,
            ClassificationRule::new(
                "operator_notice",
                r"(?i)(payment.*required|your.*number.*has.*been|subscriber.*(unavailable|not.*reachable))",
                OperatorIvr,
                NormalRouting,
                0.8,
                "Operator message detected",
                0.3,
            )?,
        ];
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn first_match(&self, text: &str) -> Option<&ClassificationRule> {
        self.rules.iter().find(|rule| rule.matches(text))
    }

    /// Best rule-tier answer: the first matching pattern rule, else a
    /// keyword-density spam candidate whose confidence grows with the
    /// number of hits. `None` when nothing fired.
    pub fn candidate(&self, text: &str) -> Option<Classification> {
        if let Some(rule) = self.first_match(text) {
            return Some(rule.to_classification());
        }
        let hits = count_phrases(text, SPAM_KEYWORDS);
        (hits >= SPAM_KEYWORD_MIN_HITS).then(|| {
            Classification::new(
                CallCategory::SpamRobocall,
                hits as f64 / 10.0,
                CallAction::RouteToAi,
                "Multiple spam keywords detected",
                0.9,
            )
        })
    }
}

/// Spam and operator phrases present in `text`, for audit trails.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let haystack = word_padded(text);
    SPAM_KEYWORDS
        .iter()
        .chain(OPERATOR_PHRASES)
        .filter(|phrase| haystack.contains(&format!(" {} ", phrase)))
        .map(|phrase| phrase.to_string())
        .collect()
}

fn count_phrases(text: &str, phrases: &[&str]) -> usize {
    let haystack = word_padded(text);
    phrases
        .iter()
        .filter(|phrase| haystack.contains(&format!(" {} ", phrase)))
        .count()
}

/// Lowercases and turns punctuation into single spaces so phrases only
/// match on word boundaries.
fn word_padded(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        out.push_str(&word.to_lowercase());
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::builtin().expect("builtin rules compile")
    }

    #[test]
    fn sim_blocked_outranks_spam_phrases() {
        let text = "Congratulations! Your SIM card has been blocked. Press 1 to win a prize";
        let set = rules();
        let rule = set.first_match(text).expect("match");
        assert_eq!(rule.name, "sim_blocked");
        assert_eq!(rule.category, CallCategory::SimBlocked);
    }

    #[test]
    fn rule_order_is_stable() {
        let names: Vec<_> = rules().rules().iter().map(|rule| rule.name).collect();
        assert_eq!(
            names,
            [
                "sim_blocked",
                "line_suspended",
                "low_credit",
                "automated_call",
                "voicemail",
                "operator_notice"
            ]
        );
    }

    #[test]
    fn suspended_line_is_not_reported_as_operator_block() {
        let c = rules()
            .candidate("This line is suspended until further notice")
            .expect("candidate");
        assert_eq!(c.category, CallCategory::SimBlocked);
        assert_eq!(c.reason, "Line suspended by operator");
    }

    #[test]
    fn keyword_density_gives_low_confidence_spam() {
        let c = rules()
            .candidate("Urgent: limited time offer on a new loan")
            .expect("candidate");
        assert_eq!(c.category, CallCategory::SpamRobocall);
        assert!((c.confidence - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn plain_conversation_has_no_candidate() {
        assert!(rules().candidate("Hi, it's me, are we still on for dinner?").is_none());
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let keywords = extract_keywords("Twin windows. Leave a message after the tone, IRS notice.");
        assert_eq!(keywords, vec!["irs", "leave a message"]);
    }
}
