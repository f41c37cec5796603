//! Structured observability hooks for event reconciliation.
//!
//! - [`event_span`] builds the span one delivery is processed in
//! - `emit_*` functions log the key lifecycle points with stable
//!   `event = "..."` field values

use tracing::{info, warn, Span};

use crate::domain::task::TaskId;

/// Span for one inbound delivery. Attach with `Instrument::instrument`.
pub fn event_span(kind: &str, delivery_id: &str) -> Span {
    tracing::info_span!("taskbridge.event", kind = %kind, delivery_id = %delivery_id)
}

/// Emit event: a delivery was accepted for processing.
pub fn emit_event_received(kind: &str) {
    info!(event = "event.received", kind = %kind);
}

/// Emit event: a reference's message was posted.
pub fn emit_reference_processed(task_id: TaskId, action: &str) {
    info!(event = "reference.processed", task_id = task_id.0, action = %action);
}

/// Emit event: a reference failed (warning level).
pub fn emit_reference_failed(task_id: TaskId, error: &dyn std::fmt::Display) {
    warn!(event = "reference.failed", task_id = task_id.0, error = %error);
}

/// Emit event: reconciliation of a delivery finished.
pub fn emit_event_completed(kind: &str, processed: usize, errors: usize) {
    info!(
        event = "event.completed",
        kind = %kind,
        processed = processed,
        errors = errors,
    );
}
