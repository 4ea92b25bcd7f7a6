//! Strongly-typed identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a queued AI request.
///
/// Generated at enqueue time. Only used to locate a request inside the
/// pending list and to correlate log lines; callers never rely on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s).map_err(|e| DomainError::invalid_id("RequestId", e))?;
        Ok(Self(uuid))
    }
}

/// Identifier of an application user.
///
/// Opaque: issued by the external auth provider, attached to requests for
/// accounting only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique_and_round_trip_through_strings() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);

        let parsed: RequestId = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn invalid_request_id_is_rejected() {
        let err = "not-a-uuid".parse::<RequestId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId { kind: "RequestId", .. }));
    }

    #[test]
    fn user_id_serializes_as_plain_string() {
        let user = UserId::from("firebase-uid-42");
        assert_eq!(serde_json::to_string(&user).unwrap(), "\"firebase-uid-42\"");
        assert_eq!(user.to_string(), "firebase-uid-42");
    }
}
