use std::fmt;

use thiserror::Error;

/// Signaling-layer call identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallId(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallIdError {
    #[error("CallId is empty")]
    Empty,
}

impl CallId {
    pub fn new(value: impl Into<String>) -> Result<Self, CallIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CallIdError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SIM card identifier as known to the SIM registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimId(String);

impl SimId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
