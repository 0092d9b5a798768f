//! Shared test infrastructure for eventid integration tests.
//!
//! Provides TestEnv helper for writing report and contract files.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use eventid::{EventReport, IdContract};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Epoch millis of 2026-01-14T10:00:00.000Z.
pub const BASE_MS: i64 = 1_768_384_800_000;

/// Instant `offset_ms` after 2026-01-14T10:00:00.000Z.
pub fn base_plus(offset_ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(BASE_MS + offset_ms).unwrap()
}

/// Build a report from a source for `user` at `BASE_MS + offset_ms`.
pub fn report(source: &str, user: &str, offset_ms: i64, activity_count: usize) -> EventReport {
    EventReport {
        source: source.to_string(),
        user_id: user.to_string(),
        start_time: base_plus(offset_ms),
        activity_count,
    }
}

/// Assert an identifier is 64 lowercase hex characters.
pub fn assert_identifier_format(id: &str) {
    assert_eq!(id.len(), 64, "wrong length: {}", id);
    assert!(
        id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')),
        "not lowercase hex: {}",
        id
    );
}

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Write reports as JSONL and return the file path.
    pub fn write_reports(&self, name: &str, reports: &[EventReport]) -> PathBuf {
        let lines: Vec<String> = reports
            .iter()
            .map(|r| serde_json::to_string(r).expect("Failed to serialize report"))
            .collect();
        self.write_raw(name, &lines.join("\n"))
    }

    /// Write arbitrary text and return the file path.
    pub fn write_raw(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// Write a contract as YAML and return the file path.
    pub fn write_contract(&self, contract: &IdContract) -> PathBuf {
        let yaml = contract.to_yaml().expect("Failed to serialize contract");
        self.write_raw("contract.yaml", &yaml)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
