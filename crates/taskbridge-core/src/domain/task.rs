//! Tracker-side entities: tasks, identities and the user mapping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Integer identifier of a task in the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved numeric stage identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub u64);

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message posted on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

/// A task as returned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stage_id: Option<StageId>,
}

impl Task {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: TaskId(id),
            name: name.into(),
            stage_id: None,
        }
    }
}

/// Maps source-control emails to tracker emails.
///
/// Lookups for unmapped emails return the input unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserMapping(HashMap<String, String>);

impl UserMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping entry.
    pub fn with(mut self, source_email: impl Into<String>, tracker_email: impl Into<String>) -> Self {
        self.0.insert(source_email.into(), tracker_email.into());
        self
    }

    /// Resolve a source-control email to the tracker email.
    pub fn map<'a>(&'a self, email: &'a str) -> &'a str {
        self.0.get(email).map(String::as_str).unwrap_or(email)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for UserMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
