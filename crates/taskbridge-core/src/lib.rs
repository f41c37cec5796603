//! taskbridge core library
//!
//! Finds task references in commit messages and pull-request text and
//! reconciles them into task-tracker updates.
//!
//! ## Key Components
//!
//! - `ReferenceParser`: reference grammar (`Closes ODP-123`, `refs ODP-7`)
//! - `Reconciler`: push / pull-request reconciliation and event intake
//! - `TaskClient`, `CommentNotifier`: capability traits for the tracker and
//!   the source-control platform

pub mod client;
pub mod domain;
pub mod fakes;
pub mod intake;
pub mod metrics;
pub mod obs;
pub mod reconcile;
pub mod reference;
pub mod render;
pub mod telemetry;

pub use client::{CommentNotifier, TaskClient};

pub use domain::{
    Account, BridgeError, Commit, CommitAuthor, EventOutcome, MessageId, NotifyError, PrAction,
    ProcessResult, PullRequest, PullRequestEvent, PushEvent, RepoCoordinates, Repository, Result,
    StageConfig, StageId, StageRef, Task, TaskId, TrackerError, TrackerResult, UserMapping,
};

pub use intake::EventKind;
pub use reconcile::{fold_commit_references, CommitReference, PrTransition, Reconciler};
pub use reference::{ReferenceAction, ReferenceParser, TaskReference};

pub use metrics::METRICS;
pub use obs::{
    emit_event_completed, emit_event_received, emit_reference_failed, emit_reference_processed,
    event_span,
};
pub use telemetry::init_tracing;

/// taskbridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
