//! Capability traits for the external collaborators.
//!
//! - `TaskClient`: fetch task, post message, resolve and set stages
//! - `CommentNotifier`: post a comment back on a pull request
//!
//! The reconciler only talks to these traits. Production implementations
//! live in `taskbridge-tracker`; in-memory fakes live in [`crate::fakes`].

use async_trait::async_trait;

use crate::domain::error::{NotifyError, TrackerResult};
use crate::domain::event::RepoCoordinates;
use crate::domain::stage::StageRef;
use crate::domain::task::{MessageId, StageId, Task, TaskId};

/// Task-tracker capability.
///
/// Implementations own any retry/backoff policy; callers treat every error
/// as final.
#[async_trait]
pub trait TaskClient: Send + Sync {
    /// Fetch a task. `Ok(None)` when the tracker has no such task.
    async fn fetch_task(&self, id: TaskId) -> TrackerResult<Option<Task>>;

    /// Post an HTML message on a task, attributed to the tracker user
    /// matching `author_email` when one can be resolved.
    async fn post_message(
        &self,
        task_id: TaskId,
        html_body: &str,
        author_email: Option<&str>,
    ) -> TrackerResult<MessageId>;

    /// Resolve a stage reference to its id. `Ok(None)` when a name has no match.
    async fn resolve_stage(&self, stage: &StageRef) -> TrackerResult<Option<StageId>>;

    /// Move a task to `stage`, or to the configured done stage when `None`.
    ///
    /// Fails with `TrackerError::StageNotFound` when a name does not resolve.
    async fn set_stage(&self, task_id: TaskId, stage: Option<&StageRef>) -> TrackerResult<()>;
}

/// Source-control comment capability.
#[async_trait]
pub trait CommentNotifier: Send + Sync {
    /// Post a plain-text comment on pull request `number` of `repo`.
    async fn post_comment(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        body: &str,
    ) -> Result<(), NotifyError>;
}
