//! Collapse event reports from several ingestion sources into one record per
//! event identifier.

use crate::id::{IdError, IdGenerator};
use crate::types::{EventReport, Identifier, ValidationError};
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// An event after deduplication.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DedupedEvent {
    pub event_id: Identifier,
    pub user_id: String,

    /// Start of the bucket every merged report fell into (epoch ms)
    pub bucket_start_ms: i64,

    /// Sources in arrival order; a source reporting twice appears once
    pub sources: Vec<String>,

    /// Every reported start time, in arrival order
    pub start_times: Vec<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub activity_ids: Vec<Identifier>,
}

/// Errors that can occur while ingesting a report.
#[derive(Debug, Clone, PartialEq)]
pub enum DedupError {
    /// Report rejected before any ids were generated.
    Validation(ValidationError),
    /// Id generation failed.
    Id(IdError),
}

impl std::fmt::Display for DedupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DedupError::Validation(e) => write!(f, "invalid report: {}", e),
            DedupError::Id(e) => write!(f, "id generation failed: {}", e),
        }
    }
}

impl std::error::Error for DedupError {}

impl From<ValidationError> for DedupError {
    fn from(e: ValidationError) -> Self {
        DedupError::Validation(e)
    }
}

impl From<IdError> for DedupError {
    fn from(e: IdError) -> Self {
        DedupError::Id(e)
    }
}

/// Outcome of ingesting one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingested {
    /// First report for this event.
    New(Identifier),
    /// Merged into an event already seen.
    Duplicate(Identifier),
}

impl Ingested {
    pub fn event_id(&self) -> &Identifier {
        match self {
            Ingested::New(id) | Ingested::Duplicate(id) => id,
        }
    }
}

/// Accumulates reports keyed by event identifier.
pub struct Deduplicator {
    generator: IdGenerator,
    events: BTreeMap<Identifier, DedupedEvent>,
}

impl Deduplicator {
    pub fn new(generator: IdGenerator) -> Self {
        Self {
            generator,
            events: BTreeMap::new(),
        }
    }

    /// Add a report, merging it with any earlier report for the same event.
    pub fn ingest(&mut self, report: &EventReport) -> Result<Ingested, DedupError> {
        report.validate()?;
        let event_id = Identifier::from_generated(self.generator.event_id(&report.user_id, report.start_time)?);

        let known = self.events.get(&event_id).map(|e| e.activity_ids.len());
        if let Some(known) = known {
            let extra = self.activity_ids(&event_id, known, report.activity_count.saturating_sub(known))?;
            if let Some(existing) = self.events.get_mut(&event_id) {
                if !existing.sources.contains(&report.source) {
                    existing.sources.push(report.source.clone());
                }
                existing.start_times.push(report.start_time);
                existing.activity_ids.extend(extra);
            }
            log::debug!("Merged report from {} into event {}", report.source, event_id);
            return Ok(Ingested::Duplicate(event_id));
        }

        let event = DedupedEvent {
            event_id: event_id.clone(),
            user_id: report.user_id.clone(),
            bucket_start_ms: self.generator.bucket_start_ms(report.start_time),
            sources: vec![report.source.clone()],
            start_times: vec![report.start_time],
            activity_ids: self.activity_ids(&event_id, 0, report.activity_count)?,
        };
        self.events.insert(event_id.clone(), event);
        log::debug!("New event {} from {}", event_id, report.source);
        Ok(Ingested::New(event_id))
    }

    /// Deduplicated events ordered by identifier.
    pub fn events(&self) -> Vec<&DedupedEvent> {
        self.events.values().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<DedupedEvent> {
        self.events.into_values().collect()
    }

    fn activity_ids(&self, event_id: &Identifier, start: usize, count: usize) -> Result<Vec<Identifier>, IdError> {
        (start..start + count)
            .map(|index| {
                self.generator
                    .activity_id(event_id.as_str(), index as u64)
                    .map(Identifier::from_generated)
            })
            .collect()
    }
}

/// Read event reports from a JSONL file, skipping lines that fail to parse or validate.
pub fn read_reports(path: &Path) -> Result<Vec<EventReport>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut reports = Vec::new();
    let mut line_count = 0;

    for line in reader.lines() {
        line_count += 1;
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::warn!("Failed to read line {}: {}", line_count, e);
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<EventReport>(&line) {
            Ok(report) => match report.validate() {
                Ok(()) => reports.push(report),
                Err(e) => log::warn!("Skipping report at line {}: {}", line_count, e),
            },
            Err(e) => {
                log::warn!("Failed to parse report at line {}: {}", line_count, e);
            }
        }
    }

    log::info!("Read {} report(s) from {}", reports.len(), path.display());
    Ok(reports)
}
