//! Event reconciliation: turns the references in one event into tracker
//! updates and a [`ProcessResult`](crate::domain::ProcessResult).
//!
//! References are processed one after another. A failure on one reference
//! is recorded and never stops the others.

pub mod pull_request;
pub mod push;

use std::sync::Arc;

use crate::client::{CommentNotifier, TaskClient};
use crate::domain::result::ProcessResult;
use crate::domain::stage::StageConfig;
use crate::domain::task::TaskId;
use crate::metrics::METRICS;
use crate::obs::emit_reference_failed;
use crate::reference::ReferenceParser;

pub use pull_request::PrTransition;
pub use push::{fold_commit_references, CommitReference};

const TASK_NOT_FOUND: &str = "Task not found";

/// Drives tracker updates for push and pull-request events.
pub struct Reconciler {
    parser: ReferenceParser,
    stages: StageConfig,
    tasks: Arc<dyn TaskClient>,
    notifier: Option<Arc<dyn CommentNotifier>>,
}

impl Reconciler {
    pub fn new(parser: ReferenceParser, stages: StageConfig, tasks: Arc<dyn TaskClient>) -> Self {
        Self {
            parser,
            stages,
            tasks,
            notifier: None,
        }
    }

    /// Post a summary comment on pull requests after reconciliation.
    pub fn with_notifier(mut self, notifier: Arc<dyn CommentNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Fetch the task and record `"<id>: Task not found"` when it is absent.
    ///
    /// Returns `true` when processing of the reference may continue.
    async fn ensure_task(&self, task_id: TaskId, result: &mut ProcessResult) -> bool {
        match self.tasks.fetch_task(task_id).await {
            Ok(Some(_)) => true,
            Ok(None) => {
                record_failure(result, task_id, &TASK_NOT_FOUND);
                false
            }
            Err(e) => {
                record_failure(result, task_id, &e);
                false
            }
        }
    }
}

fn record_failure(result: &mut ProcessResult, task_id: TaskId, error: &dyn std::fmt::Display) {
    METRICS.inc_reference_failures();
    emit_reference_failed(task_id, error);
    result.record_error(task_id, error);
}
