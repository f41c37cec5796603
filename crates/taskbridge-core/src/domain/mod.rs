//! Domain models for taskbridge.
//!
//! - `event`: inbound push / pull-request payloads
//! - `task`: tracker entities and the user mapping
//! - `stage`: stage references and transition targets
//! - `result`: per-event result records
//! - `error`: error taxonomy

pub mod error;
pub mod event;
pub mod result;
pub mod stage;
pub mod task;

pub use error::{BridgeError, NotifyError, Result, TrackerError, TrackerResult};
pub use event::{
    Account, Commit, CommitAuthor, PrAction, PullRequest, PullRequestEvent, PushEvent,
    RepoCoordinates, Repository,
};
pub use result::{EventOutcome, ProcessResult};
pub use stage::{StageConfig, StageRef};
pub use task::{MessageId, StageId, Task, TaskId, UserMapping};
