//! Push reconciliation against the in-memory tracker.

use std::sync::Arc;

use taskbridge_core::fakes::MemoryTracker;
use taskbridge_core::{
    Commit, PushEvent, Reconciler, ReferenceParser, StageConfig, StageId, StageRef, TaskId,
};

fn reconciler(tracker: Arc<MemoryTracker>, stages: StageConfig) -> Reconciler {
    Reconciler::new(ReferenceParser::new("ODP").unwrap(), stages, tracker)
}

fn commit(id: &str, message: &str) -> Commit {
    Commit::new(id, message, format!("https://github.com/acme/web/commit/{id}"))
}

fn push(commits: Vec<Commit>) -> PushEvent {
    PushEvent { commits }
}

#[tokio::test]
async fn test_missing_task_is_isolated_in_either_order() {
    for message in ["Refs ODP-1 and ODP-2", "Refs ODP-2 and ODP-1"] {
        let tracker = Arc::new(MemoryTracker::new().with_task(2));
        let result = reconciler(tracker.clone(), StageConfig::new(5))
            .process_push(&push(vec![commit("aaaaaaa0001", message)]))
            .await;

        assert_eq!(result.processed, 1, "message: {message}");
        assert_eq!(result.errors, vec!["1: Task not found".to_string()]);
        assert_eq!(tracker.messages().len(), 1);
        assert_eq!(tracker.messages()[0].task_id, TaskId(2));
    }
}

#[tokio::test]
async fn test_closing_commit_moves_task_to_done() {
    let tracker = Arc::new(MemoryTracker::new().with_task(3));
    let result = reconciler(tracker.clone(), StageConfig::new(5))
        .process_push(&push(vec![commit("abcdef0123", "Fixes ODP-3: broken login")]))
        .await;

    assert_eq!(result.processed, 1);
    assert!(result.errors.is_empty());
    assert_eq!(tracker.stage_changes(), vec![(TaskId(3), StageId(5))]);

    let message = &tracker.messages()[0];
    assert!(message
        .body
        .contains("<a href=\"https://github.com/acme/web/commit/abcdef0123\">abcdef0</a>"));
    assert!(message.body.contains("Fixes ODP-3: broken login"));
}

#[tokio::test]
async fn test_plain_reference_does_not_change_stage() {
    let tracker = Arc::new(MemoryTracker::new().with_task(3));
    let result = reconciler(tracker.clone(), StageConfig::new(5))
        .process_push(&push(vec![commit("abcdef0123", "Refs ODP-3")]))
        .await;

    assert_eq!(result.processed, 1);
    assert!(tracker.stage_changes().is_empty());
}

#[tokio::test]
async fn test_close_is_sticky_across_commits() {
    let orders = [
        vec![commit("1111111aaa", "Closes ODP-4"), commit("2222222bbb", "ODP-4 cleanup")],
        vec![commit("1111111aaa", "ODP-4 cleanup"), commit("2222222bbb", "Closes ODP-4")],
    ];

    for commits in orders {
        let tracker = Arc::new(MemoryTracker::new().with_task(4));
        let result = reconciler(tracker.clone(), StageConfig::new(5))
            .process_push(&push(commits))
            .await;

        assert_eq!(result.processed, 1);
        assert_eq!(tracker.messages().len(), 1);
        assert!(tracker.messages()[0].body.contains("2222222"));
        assert_eq!(tracker.stage_changes(), vec![(TaskId(4), StageId(5))]);
    }
}

#[tokio::test]
async fn test_message_attributed_to_commit_author() {
    let tracker = Arc::new(MemoryTracker::new().with_task(8));
    reconciler(tracker.clone(), StageConfig::new(5))
        .process_push(&push(vec![
            commit("abcdef0123", "Refs ODP-8").with_author_email("dev@example.com")
        ]))
        .await;

    assert_eq!(
        tracker.messages()[0].author_email.as_deref(),
        Some("dev@example.com")
    );
}

#[tokio::test]
async fn test_stage_failure_keeps_processed_count() {
    let tracker = Arc::new(MemoryTracker::new().with_task(3).failing_stage_change(3));
    let result = reconciler(tracker.clone(), StageConfig::new(5))
        .process_push(&push(vec![commit("abcdef0123", "Fixes ODP-3")]))
        .await;

    assert_eq!(result.processed, 1);
    assert_eq!(
        result.errors,
        vec!["3: tracker returned status 500: stage update failed".to_string()]
    );
    assert_eq!(tracker.messages().len(), 1);
}

#[tokio::test]
async fn test_unresolvable_done_stage_is_recorded() {
    let tracker = Arc::new(MemoryTracker::new().with_task(3));
    let result = reconciler(tracker.clone(), StageConfig::new(StageRef::name("Finished")))
        .process_push(&push(vec![commit("abcdef0123", "Fixes ODP-3")]))
        .await;

    assert_eq!(result.processed, 1);
    assert_eq!(result.errors, vec!["3: stage not found: Finished".to_string()]);
}

#[tokio::test]
async fn test_failed_post_is_not_counted_and_skips_stage() {
    let tracker = Arc::new(MemoryTracker::new().with_task(3).with_task(4).failing_post(3));
    let result = reconciler(tracker.clone(), StageConfig::new(5))
        .process_push(&push(vec![commit("abcdef0123", "Fixes ODP-3, fixes ODP-4")]))
        .await;

    assert_eq!(result.processed, 1);
    assert_eq!(
        result.errors,
        vec!["3: tracker error -32000: comment rejected".to_string()]
    );
    assert_eq!(tracker.stage_changes(), vec![(TaskId(4), StageId(5))]);
}

#[tokio::test]
async fn test_tasks_processed_in_first_mention_order() {
    let tracker = Arc::new(MemoryTracker::new().with_task(1).with_task(2).with_task(3));
    reconciler(tracker.clone(), StageConfig::new(5))
        .process_push(&push(vec![
            commit("1111111aaa", "ODP-3"),
            commit("2222222bbb", "ODP-1 ODP-3 ODP-2"),
        ]))
        .await;

    assert_eq!(tracker.fetches(), vec![TaskId(3), TaskId(1), TaskId(2)]);
}

#[tokio::test]
async fn test_push_without_references_touches_nothing() {
    let tracker = Arc::new(MemoryTracker::new().with_task(1));
    let result = reconciler(tracker.clone(), StageConfig::new(5))
        .process_push(&push(vec![commit("1111111aaa", "chore: fmt")]))
        .await;

    assert_eq!(result.processed, 0);
    assert!(result.errors.is_empty());
    assert!(tracker.fetches().is_empty());
}
