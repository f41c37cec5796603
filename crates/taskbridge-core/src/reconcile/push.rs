//! Push events: fold commit references per task, then post one message
//! per task and close the tasks that a commit asked to close.

use crate::domain::event::{Commit, PushEvent};
use crate::domain::result::ProcessResult;
use crate::metrics::METRICS;
use crate::obs::emit_reference_processed;
use crate::reference::{ReferenceParser, TaskReference};
use crate::render;

use super::{record_failure, Reconciler};

/// One task's reference within a push, with the commit that last mentioned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReference {
    pub reference: TaskReference,
    pub short_hash: String,
    pub commit_url: String,
    pub commit_title: String,
    pub author_email: Option<String>,
}

impl CommitReference {
    pub fn from_commit(reference: TaskReference, commit: &Commit) -> Self {
        Self {
            reference,
            short_hash: commit.short_hash().to_string(),
            commit_url: commit.url.clone(),
            commit_title: commit.title().to_string(),
            author_email: commit.author_email().map(str::to_string),
        }
    }

    /// Take `newer`'s commit metadata, keeping `Close` if either side has it.
    fn absorb(&mut self, newer: CommitReference) {
        let action = self.reference.action.merge(newer.reference.action);
        *self = newer;
        self.reference.action = action;
    }
}

/// Reduce the references of all commits into one entry per task id,
/// in order of first mention.
pub fn fold_commit_references(parser: &ReferenceParser, commits: &[Commit]) -> Vec<CommitReference> {
    commits
        .iter()
        .flat_map(|commit| {
            parser
                .parse(&commit.message)
                .into_iter()
                .map(move |reference| CommitReference::from_commit(reference, commit))
        })
        .fold(Vec::new(), |mut folded: Vec<CommitReference>, next| {
            match folded
                .iter_mut()
                .find(|entry| entry.reference.task_id == next.reference.task_id)
            {
                Some(existing) => existing.absorb(next),
                None => folded.push(next),
            }
            folded
        })
}

impl Reconciler {
    /// Reconcile a push event.
    pub async fn process_push(&self, event: &PushEvent) -> ProcessResult {
        let mut result = ProcessResult::default();

        for entry in fold_commit_references(&self.parser, &event.commits) {
            self.process_commit_reference(&entry, &mut result).await;
        }

        result
    }

    async fn process_commit_reference(&self, entry: &CommitReference, result: &mut ProcessResult) {
        let task_id = entry.reference.task_id;
        if !self.ensure_task(task_id, result).await {
            return;
        }

        let body = render::commit_message(&entry.short_hash, &entry.commit_url, &entry.commit_title);
        if let Err(e) = self
            .tasks
            .post_message(task_id, &body, entry.author_email.as_deref())
            .await
        {
            record_failure(result, task_id, &e);
            return;
        }

        result.processed += 1;
        METRICS.inc_references_processed();
        emit_reference_processed(task_id, "commit");

        if entry.reference.is_close() {
            if let Err(e) = self.tasks.set_stage(task_id, Some(&self.stages.done)).await {
                record_failure(result, task_id, &e);
            }
        }
    }
}
