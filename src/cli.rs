//! CLI argument parsing for eventid.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "eid",
    about = "Deterministic event and activity identifiers for deduplicated ingestion",
    version,
    after_help = "Logs are written to: ~/.local/share/eventid/logs/eventid.log"
)]
pub struct Cli {
    /// Identity contract YAML file (default: built-in v1 contract)
    #[arg(short, long, global = true)]
    pub contract: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate an event ID from a user ID and start time
    Event {
        /// Owning account ID
        user_id: String,

        /// Event start time (RFC 3339, e.g. 2026-01-14T10:00:00.010Z)
        start_time: DateTime<Utc>,
    },

    /// Generate an activity ID from its event ID and position
    Activity {
        /// Parent event ID
        event_id: String,

        /// Zero-based position of the activity within the event
        index: u64,
    },

    /// Generate an ID from raw parts (joined with the contract delimiter)
    Parts {
        /// Ordered parts
        #[arg(required = true)]
        parts: Vec<String>,
    },

    /// Show the time bucket a start time falls into
    Bucket {
        /// Start time (RFC 3339)
        start_time: DateTime<Utc>,
    },

    /// Deduplicate a JSONL file of event reports
    Dedup {
        /// File with one report per line
        file: PathBuf,

        /// Emit JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the active identity contract as YAML
    Contract,
}
