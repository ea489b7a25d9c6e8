//! Aggregated outcome of an organize run.

use crate::file_organizer::MoveDecision;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A file that could not be organized, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveFailure {
    /// The file that was being moved.
    pub path: PathBuf,
    /// Human-readable cause.
    pub reason: String,
    /// True when the file vanished before it could be moved.
    pub not_found: bool,
}

/// Represents the result of one organize run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Whether the run only simulated the moves.
    pub dry_run: bool,
    /// Every file that was moved (or would be, in a dry run), in processing order.
    pub moved: Vec<MoveDecision>,
    /// Files that failed, in processing order.
    pub failures: Vec<MoveFailure>,
}

impl RunReport {
    /// Creates an empty report stamped with the current time.
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            dry_run,
            moved: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Records a successful decision.
    pub fn record(&mut self, decision: MoveDecision) {
        self.moved.push(decision);
    }

    /// Records a per-file failure.
    pub fn record_failure(&mut self, failure: MoveFailure) {
        self.failures.push(failure);
    }

    /// Counts decisions per category, ordered by category name.
    ///
    /// # Example
    ///
    /// `{"Documents": 3, "Images": 5, "Others": 2}`
    pub fn summarize(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for decision in &self.moved {
            *summary.entry(decision.category.clone()).or_insert(0) += 1;
        }
        summary
    }

    /// Returns the total number of files processed.
    pub fn total_processed(&self) -> usize {
        self.moved.len() + self.failures.len()
    }

    /// Returns true if at least one file failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
