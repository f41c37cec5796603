//! Event intake: route a delivery by its type tag to the reconciler.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::error::{BridgeError, Result};
use crate::domain::event::{PullRequestEvent, PushEvent};
use crate::domain::result::EventOutcome;
use crate::metrics::METRICS;
use crate::obs::{emit_event_completed, emit_event_received};
use crate::reconcile::Reconciler;

/// Inbound event kinds, from the out-of-band type tag (`X-GitHub-Event`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Push,
    PullRequest,
    /// Acknowledged without processing.
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
            EventKind::Other(tag) => tag,
        }
    }
}

impl From<&str> for EventKind {
    fn from(tag: &str) -> Self {
        match tag {
            "push" => EventKind::Push,
            "pull_request" => EventKind::PullRequest,
            other => EventKind::Other(other.to_string()),
        }
    }
}

fn decode<T: DeserializeOwned>(kind: &EventKind, payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|source| BridgeError::MalformedEvent {
        event: kind.as_str().to_string(),
        source,
    })
}

impl Reconciler {
    /// Process one raw delivery.
    ///
    /// Fails only when a handled event's payload cannot be decoded;
    /// per-reference failures are reported inside the outcome.
    pub async fn handle_event(&self, event_type: &str, payload: &[u8]) -> Result<EventOutcome> {
        let kind = EventKind::from(event_type);
        METRICS.inc_events_received();

        let result = match &kind {
            EventKind::Push => {
                let event: PushEvent = decode(&kind, payload)?;
                emit_event_received(kind.as_str());
                self.process_push(&event).await
            }
            EventKind::PullRequest => {
                let event: PullRequestEvent = decode(&kind, payload)?;
                emit_event_received(kind.as_str());
                self.process_pull_request(&event).await
            }
            EventKind::Other(tag) => {
                debug!(kind = %tag, "acknowledging unhandled event");
                return Ok(EventOutcome::ignored(tag.as_str()));
            }
        };

        emit_event_completed(kind.as_str(), result.processed, result.errors.len());
        Ok(EventOutcome::new(kind.as_str(), result))
    }
}
