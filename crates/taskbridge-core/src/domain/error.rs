//! Error taxonomy for taskbridge.

/// Errors raised by a [`TaskClient`](crate::client::TaskClient).
///
/// A missing task is not an error: `fetch_task` returns `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// Named stage has no match in the tracker.
    #[error("stage not found: {0}")]
    StageNotFound(String),

    /// Non-success HTTP status from the tracker.
    #[error("tracker returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Network-layer failure (connect, timeout, send).
    #[error("tracker transport error: {0}")]
    Transport(String),

    /// Well-formed application-level error reported by the tracker.
    #[error("tracker error {code}: {message}")]
    Remote { code: i64, message: String },

    /// Response did not have the expected shape.
    #[error("unexpected tracker response: {0}")]
    Decode(String),
}

/// Errors raised by a [`CommentNotifier`](crate::client::CommentNotifier).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("comment post returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("comment transport error: {0}")]
    Transport(String),
}

/// Invocation-level errors. Per-reference failures never surface here.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("malformed {event} event: {source}")]
    MalformedEvent {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid task prefix {0:?}: expected one or more ASCII letters, digits or '_'")]
    InvalidPrefix(String),

    #[error("invalid reference pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for tracker operations.
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;

/// Result type for invocation-level operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_not_found_display() {
        let err = TrackerError::StageNotFound("Review".to_string());
        assert_eq!(err.to_string(), "stage not found: Review");
    }

    #[test]
    fn test_malformed_event_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = BridgeError::MalformedEvent {
            event: "push".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("malformed push event"));
    }
}
