use std::fmt;

/// Inbound call as seen by the admission filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub source_number: String,
    pub dest_number: String,
}

impl Call {
    pub fn new(source_number: impl Into<String>, dest_number: impl Into<String>) -> Self {
        Self {
            source_number: source_number.into(),
            dest_number: dest_number.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterAction {
    Route,
    Reject,
    Blackhole,
}

impl FilterAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Route => "ROUTE",
            Self::Reject => "REJECT",
            Self::Blackhole => "BLACKHOLE",
        }
    }
}

impl fmt::Display for FilterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal decision for one call. Gateway and prefix are only ever set for
/// `Route`, which is why construction goes through the named constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDecision {
    action: FilterAction,
    gateway_id: Option<String>,
    prefix: Option<String>,
    reason: String,
}

impl FilterDecision {
    pub fn route(prefix: impl Into<String>, gateway_id: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let gateway_id = gateway_id.into();
        let reason = format!("routed via prefix {} to {}", prefix, gateway_id);
        Self {
            action: FilterAction::Route,
            gateway_id: Some(gateway_id),
            prefix: Some(prefix),
            reason,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            action: FilterAction::Reject,
            gateway_id: None,
            prefix: None,
            reason: reason.into(),
        }
    }

    pub fn blackhole(reason: impl Into<String>) -> Self {
        Self {
            action: FilterAction::Blackhole,
            gateway_id: None,
            prefix: None,
            reason: reason.into(),
        }
    }

    pub fn action(&self) -> FilterAction {
        self.action
    }

    pub fn gateway_id(&self) -> Option<&str> {
        self.gateway_id.as_deref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_route(&self) -> bool {
        self.action == FilterAction::Route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_route_carries_gateway_and_prefix() {
        let routed = FilterDecision::route("212", "gw-morocco");
        assert_eq!(routed.action(), FilterAction::Route);
        assert_eq!(routed.gateway_id(), Some("gw-morocco"));
        assert_eq!(routed.prefix(), Some("212"));

        let rejected = FilterDecision::reject("no route found");
        assert_eq!(rejected.action(), FilterAction::Reject);
        assert_eq!(rejected.gateway_id(), None);
        assert_eq!(rejected.prefix(), None);
        assert_eq!(rejected.reason(), "no route found");

        let dropped = FilterDecision::blackhole("source blacklisted");
        assert_eq!(dropped.action().as_str(), "BLACKHOLE");
        assert!(!dropped.is_route());
    }
}
