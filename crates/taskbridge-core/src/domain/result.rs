//! Per-event result records.

use serde::{Deserialize, Serialize};

/// Outcome of reconciling one event.
///
/// `processed` counts references whose message was posted; `errors` holds
/// one `"<scope>: <reason>"` line per failure, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub processed: usize,
    pub errors: Vec<String>,
}

impl ProcessResult {
    pub fn record_error(&mut self, scope: impl std::fmt::Display, reason: impl std::fmt::Display) {
        self.errors.push(format!("{scope}: {reason}"));
    }
}

/// What the intake boundary returns for one delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub event: String,
    pub processed: usize,
    pub errors: Vec<String>,
}

impl EventOutcome {
    pub fn new(event: impl Into<String>, result: ProcessResult) -> Self {
        Self {
            event: event.into(),
            processed: result.processed,
            errors: result.errors,
        }
    }

    /// No-op acknowledgement for event kinds the bridge does not handle.
    pub fn ignored(event: impl Into<String>) -> Self {
        Self::new(event, ProcessResult::default())
    }
}
