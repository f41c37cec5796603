//! Inbound webhook payloads.
//!
//! Only the fields the reconciler reads are modelled; everything else in
//! the delivery is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// A `push` delivery: an ordered list of commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(default)]
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Commit {
    pub fn new(id: impl Into<String>, message: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            url: url.into(),
            author: None,
        }
    }

    pub fn with_author_email(mut self, email: impl Into<String>) -> Self {
        self.author = Some(CommitAuthor {
            name: None,
            email: Some(email.into()),
        });
        self
    }

    /// First 7 characters of the commit id.
    pub fn short_hash(&self) -> &str {
        match self.id.char_indices().nth(7) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// First line of the commit message.
    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim_end()
    }

    pub fn author_email(&self) -> Option<&str> {
        self.author
            .as_ref()
            .and_then(|a| a.email.as_deref())
            .filter(|e| !e.is_empty())
    }
}

/// Pull-request lifecycle action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PrAction {
    Opened,
    Edited,
    Closed,
    Reopened,
    Other(String),
}

impl PrAction {
    pub fn as_str(&self) -> &str {
        match self {
            PrAction::Opened => "opened",
            PrAction::Edited => "edited",
            PrAction::Closed => "closed",
            PrAction::Reopened => "reopened",
            PrAction::Other(raw) => raw,
        }
    }

    /// Actions the reconciler acts on; everything else is ignored.
    pub fn is_handled(&self) -> bool {
        !matches!(self, PrAction::Other(_))
    }
}

impl From<String> for PrAction {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "opened" => PrAction::Opened,
            "edited" => PrAction::Edited,
            "closed" => PrAction::Closed,
            "reopened" => PrAction::Reopened,
            _ => PrAction::Other(raw),
        }
    }
}

impl From<&str> for PrAction {
    fn from(raw: &str) -> Self {
        PrAction::from(raw.to_string())
    }
}

impl From<PrAction> for String {
    fn from(action: PrAction) -> Self {
        action.as_str().to_string()
    }
}

impl std::fmt::Display for PrAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `pull_request` delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub action: PrAction,
    pub number: u64,
    pub pull_request: PullRequest,
    pub repository: Repository,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub user: Option<Account>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Account,
}

/// Owner/name pair addressing a repository on the source-control platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoCoordinates {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn coordinates(&self) -> RepoCoordinates {
        RepoCoordinates {
            owner: self.owner.login.clone(),
            name: self.name.clone(),
        }
    }
}

impl std::fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl PullRequestEvent {
    /// Text scanned for references: title, newline, body.
    pub fn reference_text(&self) -> String {
        format!(
            "{}\n{}",
            self.pull_request.title,
            self.pull_request.body.as_deref().unwrap_or("")
        )
    }

    pub fn is_merged(&self) -> bool {
        self.pull_request.merged.unwrap_or(false)
    }

    pub fn author_login(&self) -> Option<&str> {
        self.pull_request.user.as_ref().map(|u| u.login.as_str())
    }
}
