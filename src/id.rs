//! Deterministic identifier generation for events and activities.
//!
//! An event identifier is SHA256("<user_id>:<bucketed start ms>") rendered as
//! 64 lowercase hex chars. Start times are floored to a fixed-width bucket so
//! the same physical event reported by several services with slight clock
//! drift lands on the same identifier.

use crate::contract::{ContractError, IdContract};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Errors from identifier generation.
#[derive(Debug, Clone, PartialEq)]
pub enum IdError {
    /// The requested digest algorithm cannot be computed here.
    DigestUnavailable(String),
    /// The contract handed to the generator is invalid.
    Contract(ContractError),
}

impl std::fmt::Display for IdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdError::DigestUnavailable(name) => {
                write!(f, "digest '{}' is unavailable: identifiers require sha256", name)
            }
            IdError::Contract(e) => write!(f, "invalid identity contract: {}", e),
        }
    }
}

impl std::error::Error for IdError {}

impl From<ContractError> for IdError {
    fn from(e: ContractError) -> Self {
        IdError::Contract(e)
    }
}

/// Floor `start` to the beginning of its `width_ms` bucket, in epoch milliseconds.
///
/// Uses floor division, so pre-epoch instants round toward negative infinity
/// (-1ms lands in [-100, 0) for a 100ms width).
///
/// # Panics
///
/// Panics if `width_ms` is not positive.
pub fn bucket_start_ms(start: DateTime<Utc>, width_ms: i64) -> i64 {
    assert!(width_ms > 0, "bucket width must be positive, got {}ms", width_ms);
    start.timestamp_millis().div_euclid(width_ms) * width_ms
}

fn digest_hex(algorithm: &str, bytes: &[u8]) -> Result<String, IdError> {
    match algorithm.to_ascii_lowercase().as_str() {
        "sha256" | "sha-256" => Ok(format!("{:x}", Sha256::digest(bytes))),
        _ => Err(IdError::DigestUnavailable(algorithm.to_string())),
    }
}

fn check_digest(algorithm: &str) -> Result<(), IdError> {
    digest_hex(algorithm, &[]).map(|_| ())
}

/// Join and hash. Every identifier in this crate goes through here.
fn hash_parts<S: AsRef<str>>(delimiter: &str, digest: &str, parts: &[S]) -> Result<String, IdError> {
    let joined = parts.iter().map(AsRef::as_ref).collect::<Vec<&str>>().join(delimiter);
    let id = digest_hex(digest, joined.as_bytes())?;
    log::debug!("Generated id {} from {} part(s)", id, parts.len());
    Ok(id)
}

/// Generate an identifier from ordered parts using the v1 contract.
pub fn generate_id_from_parts<S: AsRef<str>>(parts: &[S]) -> Result<String, IdError> {
    IdGenerator::default().id_from_parts(parts)
}

/// Generate an event identifier from its owner and start time using the v1 contract.
pub fn generate_event_id(user_id: &str, start_time: DateTime<Utc>) -> Result<String, IdError> {
    IdGenerator::default().event_id(user_id, start_time)
}

/// Generate an activity identifier from its parent event and position.
pub fn generate_activity_id(event_id: &str, index: u64) -> Result<String, IdError> {
    IdGenerator::default().activity_id(event_id, index)
}

/// Identifier generator bound to an explicit contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    contract: IdContract,
}

impl IdGenerator {
    /// Build a generator, validating the contract and its digest up front.
    pub fn new(contract: IdContract) -> Result<Self, IdError> {
        contract.validate()?;
        check_digest(&contract.digest)?;
        Ok(Self { contract })
    }

    pub fn contract(&self) -> &IdContract {
        &self.contract
    }

    pub fn bucket_start_ms(&self, start: DateTime<Utc>) -> i64 {
        bucket_start_ms(start, self.contract.bucket_width_ms)
    }

    pub fn id_from_parts<S: AsRef<str>>(&self, parts: &[S]) -> Result<String, IdError> {
        hash_parts(&self.contract.delimiter, &self.contract.digest, parts)
    }

    pub fn event_id(&self, user_id: &str, start_time: DateTime<Utc>) -> Result<String, IdError> {
        let bucketed = self.bucket_start_ms(start_time).to_string();
        self.id_from_parts(&[user_id, bucketed.as_str()])
    }

    pub fn activity_id(&self, event_id: &str, index: u64) -> Result<String, IdError> {
        let index = index.to_string();
        self.id_from_parts(&[event_id, index.as_str()])
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            contract: IdContract::v1(),
        }
    }
}
