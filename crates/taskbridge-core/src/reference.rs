//! Task reference grammar.
//!
//! A reference is `<PREFIX>-<digits>`, optionally preceded on the same line
//! by a keyword. Closing keywords (`closes`, `fixes`, `resolves`, ...) yield
//! [`ReferenceAction::Close`]; referencing keywords (`refs`, `see`, ...) and
//! bare mentions yield [`ReferenceAction::Ref`].

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::{BridgeError, Result};
use crate::domain::task::TaskId;

const CLOSING_KEYWORDS: &str = r"close[sd]?|fix(?:e[sd])?|resolve[sd]?";
const REFERENCING_KEYWORDS: &str = r"ref(?:s|erences?)?|see";

/// What a reference asks the bridge to do with the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceAction {
    Close,
    Ref,
}

impl ReferenceAction {
    fn from_keyword(keyword: Option<&str>) -> Self {
        let Some(keyword) = keyword else {
            return ReferenceAction::Ref;
        };
        let keyword = keyword.to_ascii_lowercase();
        if ["close", "fix", "resolve"]
            .iter()
            .any(|stem| keyword.starts_with(stem))
        {
            ReferenceAction::Close
        } else {
            ReferenceAction::Ref
        }
    }

    /// Closing wins when two references to the same task are merged.
    pub fn merge(self, other: ReferenceAction) -> ReferenceAction {
        if self == ReferenceAction::Close || other == ReferenceAction::Close {
            ReferenceAction::Close
        } else {
            ReferenceAction::Ref
        }
    }
}

/// A task mention found in free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskReference {
    pub action: ReferenceAction,
    pub task_id: TaskId,
}

impl TaskReference {
    pub fn close(task_id: u64) -> Self {
        Self {
            action: ReferenceAction::Close,
            task_id: TaskId(task_id),
        }
    }

    pub fn mention(task_id: u64) -> Self {
        Self {
            action: ReferenceAction::Ref,
            task_id: TaskId(task_id),
        }
    }

    pub fn is_close(&self) -> bool {
        self.action == ReferenceAction::Close
    }
}

/// Extracts [`TaskReference`]s for one task prefix.
///
/// Parsing is pure: the same text always yields the same references, in
/// first-occurrence order, at most one per task id. The first mention of an
/// id decides its action.
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    prefix: String,
    pattern: Regex,
}

impl ReferenceParser {
    /// Build a parser for `prefix` (e.g. `ODP` matches `ODP-123`).
    pub fn new(prefix: &str) -> Result<Self> {
        if prefix.is_empty()
            || !prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(BridgeError::InvalidPrefix(prefix.to_string()));
        }

        let source = format!(
            r"(?:\b(?i:({CLOSING_KEYWORDS}|{REFERENCING_KEYWORDS})):?[ \t]+)?\b{}-([0-9]+)\b",
            regex::escape(prefix)
        );
        let pattern = Regex::new(&source)?;

        Ok(Self {
            prefix: prefix.to_string(),
            pattern,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Render a task id the way it appears in text (`ODP-123`).
    pub fn display_id(&self, task_id: TaskId) -> String {
        format!("{}-{}", self.prefix, task_id)
    }

    /// Find all task references in `text`.
    pub fn parse(&self, text: &str) -> Vec<TaskReference> {
        let mut seen = HashSet::new();
        let mut references = Vec::new();

        for caps in self.pattern.captures_iter(text) {
            // Zero and out-of-range ids are not task ids.
            let Some(id) = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<u64>().ok())
                .filter(|id| *id > 0)
            else {
                continue;
            };

            let task_id = TaskId(id);
            if !seen.insert(task_id) {
                continue;
            }

            references.push(TaskReference {
                action: ReferenceAction::from_keyword(caps.get(1).map(|m| m.as_str())),
                task_id,
            });
        }

        references
    }
}
