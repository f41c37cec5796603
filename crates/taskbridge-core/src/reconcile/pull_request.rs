//! Pull-request events: post a message on every referenced task, move it
//! to the stage the PR lifecycle implies, and summarize on the PR.

use tracing::{debug, warn};

use crate::domain::event::{PrAction, PullRequestEvent};
use crate::domain::result::ProcessResult;
use crate::domain::stage::{StageConfig, StageRef};
use crate::metrics::METRICS;
use crate::obs::emit_reference_processed;
use crate::reference::TaskReference;
use crate::render;

use super::{record_failure, Reconciler};

/// Lifecycle class of a pull-request event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrTransition {
    Merged,
    ClosedUnmerged,
    Opened,
    /// `edited`: no stage change.
    Unchanged,
}

impl PrTransition {
    pub fn classify(action: &PrAction, merged: bool) -> Self {
        match action {
            PrAction::Closed if merged => PrTransition::Merged,
            PrAction::Closed => PrTransition::ClosedUnmerged,
            PrAction::Opened | PrAction::Reopened => PrTransition::Opened,
            _ => PrTransition::Unchanged,
        }
    }

    /// Stage a referenced task should move to, if any.
    ///
    /// Merging only completes tasks the PR explicitly closes; closing
    /// without merge and (re)opening apply to every reference when the
    /// matching stage is configured.
    pub fn target_stage<'a>(
        &self,
        reference: &TaskReference,
        stages: &'a StageConfig,
    ) -> Option<&'a StageRef> {
        match self {
            PrTransition::Merged if reference.is_close() => Some(&stages.done),
            PrTransition::ClosedUnmerged => stages.canceled.as_ref(),
            PrTransition::Opened => stages.in_progress.as_ref(),
            _ => None,
        }
    }
}

impl Reconciler {
    /// Reconcile a pull-request event.
    pub async fn process_pull_request(&self, event: &PullRequestEvent) -> ProcessResult {
        let mut result = ProcessResult::default();

        if !event.action.is_handled() {
            debug!(action = %event.action, "ignoring pull request action");
            return result;
        }

        let references = self.parser.parse(&event.reference_text());
        if references.is_empty() {
            debug!(number = event.number, "pull request has no task references");
            return result;
        }

        let merged = event.is_merged();
        let transition = PrTransition::classify(&event.action, merged);
        let body = render::pull_request_message(
            render::pull_request_action_word(&event.action, merged),
            event.number,
            &event.pull_request.html_url,
            &event.pull_request.title,
            event.author_login(),
        );

        let mut updated = Vec::new();
        for reference in &references {
            let target = transition.target_stage(reference, &self.stages);
            if self
                .process_pr_reference(reference, &body, target, &mut result)
                .await
            {
                updated.push(self.parser.display_id(reference.task_id));
            }
        }

        if event.action != PrAction::Closed && !updated.is_empty() {
            self.notify_pull_request(event, &updated, &mut result).await;
        }

        result
    }

    /// Returns `true` when the message and any stage change both succeeded.
    async fn process_pr_reference(
        &self,
        reference: &TaskReference,
        body: &str,
        target: Option<&StageRef>,
        result: &mut ProcessResult,
    ) -> bool {
        let task_id = reference.task_id;
        if !self.ensure_task(task_id, result).await {
            return false;
        }

        if let Err(e) = self.tasks.post_message(task_id, body, None).await {
            record_failure(result, task_id, &e);
            return false;
        }

        result.processed += 1;
        METRICS.inc_references_processed();
        emit_reference_processed(task_id, "pull_request");

        if let Some(stage) = target {
            if let Err(e) = self.tasks.set_stage(task_id, Some(stage)).await {
                record_failure(result, task_id, &e);
                return false;
            }
        }

        true
    }

    async fn notify_pull_request(
        &self,
        event: &PullRequestEvent,
        updated: &[String],
        result: &mut ProcessResult,
    ) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let repo = event.repository.coordinates();
        let comment = render::summary_comment(updated);
        match notifier.post_comment(&repo, event.number, &comment).await {
            Ok(()) => METRICS.inc_comments_posted(),
            Err(e) => {
                warn!(error = %e, repo = %repo, number = event.number, "failed to post pull request comment");
                result.record_error(format!("#{}", event.number), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stages() -> StageConfig {
        StageConfig::new(5).with_in_progress(2).with_canceled(6)
    }

    #[test]
    fn test_classify() {
        assert_eq!(PrTransition::classify(&PrAction::Closed, true), PrTransition::Merged);
        assert_eq!(
            PrTransition::classify(&PrAction::Closed, false),
            PrTransition::ClosedUnmerged
        );
        assert_eq!(PrTransition::classify(&PrAction::Opened, false), PrTransition::Opened);
        assert_eq!(PrTransition::classify(&PrAction::Reopened, true), PrTransition::Opened);
        assert_eq!(PrTransition::classify(&PrAction::Edited, true), PrTransition::Unchanged);
    }

    #[test]
    fn test_merged_only_completes_closing_references() {
        let stages = stages();
        assert_eq!(
            PrTransition::Merged.target_stage(&TaskReference::close(1), &stages),
            Some(&StageRef::Id(5))
        );
        assert_eq!(
            PrTransition::Merged.target_stage(&TaskReference::mention(1), &stages),
            None
        );
    }

    #[test]
    fn test_closed_unmerged_cancels_any_reference() {
        let stages = stages();
        assert_eq!(
            PrTransition::ClosedUnmerged.target_stage(&TaskReference::close(1), &stages),
            Some(&StageRef::Id(6))
        );
        assert_eq!(
            PrTransition::ClosedUnmerged.target_stage(&TaskReference::mention(1), &stages),
            Some(&StageRef::Id(6))
        );
    }

    #[test]
    fn test_optional_stages_suppress_transitions() {
        let stages = StageConfig::new(5);
        assert_eq!(
            PrTransition::ClosedUnmerged.target_stage(&TaskReference::mention(1), &stages),
            None
        );
        assert_eq!(
            PrTransition::Opened.target_stage(&TaskReference::close(1), &stages),
            None
        );
    }

    #[test]
    fn test_edited_never_transitions() {
        assert_eq!(
            PrTransition::Unchanged.target_stage(&TaskReference::close(1), &stages()),
            None
        );
    }
}
