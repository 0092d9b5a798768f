//! eventid: deterministic identifiers for deduplicating ingested fitness events.
//!
//! The same workout reported by several services (each with its own clock
//! drift) should land on one record. Event identifiers hash the owning user
//! together with the start time floored to a 100ms bucket; activity
//! identifiers hash the parent event identifier with the activity's position.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use eventid::{generate_activity_id, generate_event_id};
//!
//! let garmin = Utc.timestamp_millis_opt(1_768_384_800_010).unwrap();
//! let suunto = Utc.timestamp_millis_opt(1_768_384_800_050).unwrap();
//!
//! let event = generate_event_id("user123", garmin).unwrap();
//! assert_eq!(event, generate_event_id("user123", suunto).unwrap());
//!
//! let first = generate_activity_id(&event, 0).unwrap();
//! assert_eq!(first.len(), 64);
//! ```

mod contract;
mod dedup;
mod id;
mod types;

// Re-export public API
pub use contract::{BUCKET_WIDTH_MS, ContractError, DELIMITER, DIGEST, ENCODING, IdContract};
pub use dedup::{DedupError, DedupedEvent, Deduplicator, Ingested, read_reports};
pub use id::{IdError, IdGenerator, bucket_start_ms, generate_activity_id, generate_event_id, generate_id_from_parts};
pub use types::{EventReport, IDENTIFIER_LEN, Identifier, MAX_ACTIVITIES_PER_EVENT, ValidationError};
