//! In-memory fakes for the capability traits (testing only)
//!
//! `MemoryTracker` implements [`TaskClient`] over a task map and records
//! every call; `RecordingNotifier` implements [`CommentNotifier`] and keeps
//! the comments it was asked to post.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{CommentNotifier, TaskClient};
use crate::domain::error::{NotifyError, TrackerError, TrackerResult};
use crate::domain::event::RepoCoordinates;
use crate::domain::stage::StageRef;
use crate::domain::task::{MessageId, StageId, Task, TaskId};

// ---------------------------------------------------------------------------
// MemoryTracker
// ---------------------------------------------------------------------------

/// A message recorded by [`MemoryTracker::post_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub task_id: TaskId,
    pub body: String,
    pub author_email: Option<String>,
}

#[derive(Debug, Default)]
struct TrackerState {
    tasks: HashMap<TaskId, Task>,
    stages: HashMap<String, StageId>,
    fetches: Vec<TaskId>,
    messages: Vec<PostedMessage>,
    stage_changes: Vec<(TaskId, StageId)>,
    failing_posts: HashSet<TaskId>,
    failing_stage_changes: HashSet<TaskId>,
}

/// In-memory task tracker.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    done: Option<StageRef>,
    state: Mutex<TrackerState>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage used when `set_stage` is called without one.
    pub fn with_done_stage(mut self, stage: impl Into<StageRef>) -> Self {
        self.done = Some(stage.into());
        self
    }

    pub fn with_task(self, id: u64) -> Self {
        self.insert_task(Task::new(id, format!("Task {id}")));
        self
    }

    pub fn with_named_stage(self, name: &str, id: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .stages
            .insert(name.to_string(), StageId(id));
        self
    }

    /// Make `post_message` fail for this task.
    pub fn failing_post(self, id: u64) -> Self {
        self.state.lock().unwrap().failing_posts.insert(TaskId(id));
        self
    }

    /// Make `set_stage` fail for this task.
    pub fn failing_stage_change(self, id: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_stage_changes
            .insert(TaskId(id));
        self
    }

    pub fn insert_task(&self, task: Task) {
        self.state.lock().unwrap().tasks.insert(task.id, task);
    }

    pub fn task(&self, id: u64) -> Option<Task> {
        self.state.lock().unwrap().tasks.get(&TaskId(id)).cloned()
    }

    /// Task ids passed to `fetch_task`, in call order.
    pub fn fetches(&self) -> Vec<TaskId> {
        self.state.lock().unwrap().fetches.clone()
    }

    pub fn messages(&self) -> Vec<PostedMessage> {
        self.state.lock().unwrap().messages.clone()
    }

    /// Successful `set_stage` calls as `(task, resolved stage)`.
    pub fn stage_changes(&self) -> Vec<(TaskId, StageId)> {
        self.state.lock().unwrap().stage_changes.clone()
    }
}

#[async_trait]
impl TaskClient for MemoryTracker {
    async fn fetch_task(&self, id: TaskId) -> TrackerResult<Option<Task>> {
        let mut state = self.state.lock().unwrap();
        state.fetches.push(id);
        Ok(state.tasks.get(&id).cloned())
    }

    async fn post_message(
        &self,
        task_id: TaskId,
        html_body: &str,
        author_email: Option<&str>,
    ) -> TrackerResult<MessageId> {
        let mut state = self.state.lock().unwrap();
        if state.failing_posts.contains(&task_id) {
            return Err(TrackerError::Remote {
                code: -32000,
                message: "comment rejected".to_string(),
            });
        }
        state.messages.push(PostedMessage {
            task_id,
            body: html_body.to_string(),
            author_email: author_email.map(str::to_string),
        });
        Ok(MessageId(state.messages.len() as u64))
    }

    async fn resolve_stage(&self, stage: &StageRef) -> TrackerResult<Option<StageId>> {
        match stage {
            StageRef::Id(id) => Ok(Some(StageId(*id))),
            StageRef::Name(name) => Ok(self.state.lock().unwrap().stages.get(name).copied()),
        }
    }

    async fn set_stage(&self, task_id: TaskId, stage: Option<&StageRef>) -> TrackerResult<()> {
        let stage = stage
            .or(self.done.as_ref())
            .ok_or_else(|| TrackerError::StageNotFound("done".to_string()))?;
        let stage_id = self
            .resolve_stage(stage)
            .await?
            .ok_or_else(|| TrackerError::StageNotFound(stage.to_string()))?;

        let mut state = self.state.lock().unwrap();
        if state.failing_stage_changes.contains(&task_id) {
            return Err(TrackerError::Status {
                status: 500,
                body: "stage update failed".to_string(),
            });
        }
        if let Some(task) = state.tasks.get_mut(&task_id) {
            task.stage_id = Some(stage_id);
        }
        state.stage_changes.push((task_id, stage_id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

/// A comment recorded by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedComment {
    pub repo: RepoCoordinates,
    pub number: u64,
    pub body: String,
}

/// Notifier that records comments, optionally failing every post.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    fail: bool,
    comments: Mutex<Vec<PostedComment>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            comments: Mutex::default(),
        }
    }

    pub fn comments(&self) -> Vec<PostedComment> {
        self.comments.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommentNotifier for RecordingNotifier {
    async fn post_comment(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        body: &str,
    ) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        self.comments.lock().unwrap().push(PostedComment {
            repo: repo.clone(),
            number,
            body: body.to_string(),
        });
        Ok(())
    }
}
