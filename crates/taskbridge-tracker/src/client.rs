//! `TaskClient` over the tracker's JSON-RPC API.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use taskbridge_core::{
    MessageId, StageId, StageRef, Task, TaskClient, TaskId, TrackerError, TrackerResult,
    UserMapping,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::rpc::RpcClient;

#[derive(Debug, Deserialize)]
struct Created {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct StageRecord {
    id: u64,
    name: String,
}

/// Tracker client.
///
/// Author lookups are cached by commit email for the life of the client.
/// Failed lookups are not cached so a later call may still succeed.
#[derive(Debug)]
pub struct TrackerClient {
    rpc: RpcClient,
    done: StageRef,
    default_author_id: Option<u64>,
    user_mapping: UserMapping,
    authors: RwLock<HashMap<String, u64>>,
}

impl TrackerClient {
    /// `done` is the stage used by `set_stage(task, None)`.
    pub fn new(config: &TrackerConfig, done: StageRef) -> TrackerResult<Self> {
        Ok(Self {
            rpc: RpcClient::new(config)?,
            done,
            default_author_id: config.default_author_id,
            user_mapping: UserMapping::default(),
            authors: RwLock::new(HashMap::new()),
        })
    }

    /// Rewrite commit emails before looking them up in the tracker.
    pub fn with_user_mapping(mut self, mapping: UserMapping) -> Self {
        self.user_mapping = mapping;
        self
    }

    /// Tracker user id for `email`, or the default identity.
    async fn resolve_author(&self, email: Option<&str>) -> Option<u64> {
        let Some(email) = email else {
            return self.default_author_id;
        };

        if let Some(id) = self.authors.read().await.get(email) {
            return Some(*id);
        }

        let lookup = self.user_mapping.map(email);
        match self
            .rpc
            .call::<Option<UserRecord>>("user.find", json!({ "email": lookup }))
            .await
        {
            Ok(Some(user)) => {
                self.authors.write().await.insert(email.to_string(), user.id);
                Some(user.id)
            }
            Ok(None) => {
                debug!(email = %lookup, "no tracker user for author");
                self.default_author_id
            }
            Err(e) => {
                warn!(email = %lookup, error = %e, "author lookup failed");
                self.default_author_id
            }
        }
    }
}

#[async_trait]
impl TaskClient for TrackerClient {
    async fn fetch_task(&self, id: TaskId) -> TrackerResult<Option<Task>> {
        self.rpc.call("task.get", json!({ "id": id })).await
    }

    async fn post_message(
        &self,
        task_id: TaskId,
        html_body: &str,
        author_email: Option<&str>,
    ) -> TrackerResult<MessageId> {
        let mut params = json!({ "task_id": task_id, "body": html_body });
        if let Some(author) = self.resolve_author(author_email).await {
            params["author_id"] = json!(author);
        }
        let created: Created = self.rpc.call("comment.add", params).await?;
        Ok(MessageId(created.id))
    }

    async fn resolve_stage(&self, stage: &StageRef) -> TrackerResult<Option<StageId>> {
        let name = match stage {
            StageRef::Id(id) => return Ok(Some(StageId(*id))),
            StageRef::Name(name) => name.trim(),
        };
        let stages: Vec<StageRecord> = self.rpc.call("stage.list", json!({})).await?;
        Ok(stages
            .into_iter()
            .find(|s| s.name.trim().eq_ignore_ascii_case(name))
            .map(|s| StageId(s.id)))
    }

    async fn set_stage(&self, task_id: TaskId, stage: Option<&StageRef>) -> TrackerResult<()> {
        let stage = stage.unwrap_or(&self.done);
        let stage_id = self
            .resolve_stage(stage)
            .await?
            .ok_or_else(|| TrackerError::StageNotFound(stage.to_string()))?;
        let _: Value = self
            .rpc
            .call("task.update", json!({ "id": task_id, "stage_id": stage_id }))
            .await?;
        Ok(())
    }
}
