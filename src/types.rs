//! Core data types for event identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of a rendered SHA-256 identifier.
pub const IDENTIFIER_LEN: usize = 64;

/// Upper bound on activities a single report may attach to an event.
pub const MAX_ACTIVITIES_PER_EVENT: usize = 1_000;

/// A generated event or activity identifier: 64 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Parse a string that must already be a rendered identifier.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let well_formed = value.len() == IDENTIFIER_LEN
            && value.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(ValidationError::InvalidIdentifier(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    /// Wrap output of the id generator, which is always well formed.
    pub(crate) fn from_generated(value: String) -> Self {
        debug_assert!(Identifier::parse(&value).is_ok());
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identifier::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// One ingestion source's report of an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventReport {
    /// Reporting service, e.g. "garmin" or "suunto"
    pub source: String,

    /// Owning account
    pub user_id: String,

    /// Start time as reported by the source
    pub start_time: DateTime<Utc>,

    /// Number of activities the source attached to the event
    #[serde(default)]
    pub activity_count: usize,
}

impl EventReport {
    /// Validate the report's fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.activity_count > MAX_ACTIVITIES_PER_EVENT {
            return Err(ValidationError::TooManyActivities(self.activity_count));
        }
        Ok(())
    }
}

/// Validation errors for identity values.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidIdentifier(String),
    TooManyActivities(usize),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidIdentifier(value) => {
                write!(f, "invalid identifier '{}': must be 64 lowercase hex characters", value)
            }
            ValidationError::TooManyActivities(count) => {
                write!(
                    f,
                    "activity count {} exceeds {} per event",
                    count, MAX_ACTIVITIES_PER_EVENT
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA_OF_TEST: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    #[test]
    fn test_parse_valid() {
        let id = Identifier::parse(SHA_OF_TEST).unwrap();
        assert_eq!(id.as_str(), SHA_OF_TEST);
        assert_eq!(id.to_string(), SHA_OF_TEST);
    }

    #[test]
    fn test_parse_rejects_uppercase_and_short() {
        assert!(Identifier::parse(&SHA_OF_TEST.to_uppercase()).is_err());
        assert!(Identifier::parse(&SHA_OF_TEST[..63]).is_err());
        assert!(Identifier::parse("").is_err());
    }

    #[test]
    fn test_identifier_serde_is_a_plain_string() {
        let id = Identifier::parse(SHA_OF_TEST).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", SHA_OF_TEST));

        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<Identifier>("\"not-an-id\"").is_err());
    }

    #[test]
    fn test_report_activity_count_defaults_to_zero() {
        let report: EventReport = serde_json::from_str(
            r#"{"source":"garmin","user_id":"user123","start_time":"2026-01-14T10:00:00.010Z"}"#,
        )
        .unwrap();
        assert_eq!(report.activity_count, 0);
        assert_eq!(report.start_time.timestamp_millis(), 1_768_384_800_010);
    }

    #[test]
    fn test_report_activity_count_bounded() {
        let mut report = EventReport {
            source: "garmin".to_string(),
            user_id: "user123".to_string(),
            start_time: Utc::now(),
            activity_count: MAX_ACTIVITIES_PER_EVENT,
        };
        assert!(report.validate().is_ok());

        report.activity_count = MAX_ACTIVITIES_PER_EVENT + 1;
        assert_eq!(
            report.validate(),
            Err(ValidationError::TooManyActivities(MAX_ACTIVITIES_PER_EVENT + 1))
        );
    }
}
