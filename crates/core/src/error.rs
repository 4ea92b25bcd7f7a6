//! Input errors shared by the queue crates.

use thiserror::Error;

/// A value supplied from outside (HTTP body, env var, log line) could not be
/// turned into one of our types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {kind}: {reason}")]
    InvalidId { kind: &'static str, reason: String },

    #[error("unknown priority '{0}' (expected high, normal or low)")]
    UnknownPriority(String),
}

impl DomainError {
    pub fn invalid_id(kind: &'static str, reason: impl ToString) -> Self {
        Self::InvalidId {
            kind,
            reason: reason.to_string(),
        }
    }

    pub fn unknown_priority(value: impl Into<String>) -> Self {
        Self::UnknownPriority(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(
            DomainError::invalid_id("RequestId", "bad length").to_string(),
            "invalid RequestId: bad length"
        );
        assert!(DomainError::unknown_priority("urgent")
            .to_string()
            .contains("'urgent'"));
    }
}
