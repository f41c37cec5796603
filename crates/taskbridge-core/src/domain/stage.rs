//! Stage references and the stage configuration used for transitions.

use serde::{Deserialize, Serialize};

/// A stage given either by numeric id or by name.
///
/// Names need remote resolution; ids are used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageRef {
    Id(u64),
    Name(String),
}

impl StageRef {
    pub fn name(name: impl Into<String>) -> Self {
        StageRef::Name(name.into())
    }
}

impl From<u64> for StageRef {
    fn from(id: u64) -> Self {
        StageRef::Id(id)
    }
}

impl From<&str> for StageRef {
    fn from(name: &str) -> Self {
        StageRef::Name(name.to_string())
    }
}

impl std::fmt::Display for StageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageRef::Id(id) => write!(f, "{id}"),
            StageRef::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Target stages for transitions.
///
/// `done` is always present. A missing `in_progress` or `canceled`
/// suppresses the corresponding transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub done: StageRef,
    #[serde(default)]
    pub in_progress: Option<StageRef>,
    #[serde(default)]
    pub canceled: Option<StageRef>,
}

impl StageConfig {
    pub fn new(done: impl Into<StageRef>) -> Self {
        Self {
            done: done.into(),
            in_progress: None,
            canceled: None,
        }
    }

    pub fn with_in_progress(mut self, stage: impl Into<StageRef>) -> Self {
        self.in_progress = Some(stage.into());
        self
    }

    pub fn with_canceled(mut self, stage: impl Into<StageRef>) -> Self {
        self.canceled = Some(stage.into());
        self
    }
}
