use course_studio::backend::{ApiError, MockBackend, ReorderRequest, StudioContext};
use course_studio::model::{BaseClass, CourseOutline, Lesson, ListKey, NodeId, Path, Section};
use course_studio::studio::{
    ErrorScope, ReorderOutcome, SelectTarget, SelectedItem, StudioActor, StudioClient, SyncStatus,
};
use course_studio::tree::{CourseTree, IgnoreReason};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Real studio actor, mocked backend.
///
/// Pattern: Actor + Mocks
/// - Real `StudioActor` (tests the optimistic update, rollback and sequencing)
/// - `MockBackend` with held responses, so the optimistic window can be observed
fn start(mock: &Arc<MockBackend>) -> (StudioClient, JoinHandle<()>) {
    let tree = CourseTree::from_outline(CourseOutline {
        course: BaseClass::new("C", "Algebra"),
        paths: vec![
            Path::new("A", "Numbers", 0),
            Path::new("B", "Variables", 1),
            Path::new("D", "Equations", 2),
        ],
    });
    let (actor, client) = StudioActor::new(8, tree);
    let handle = tokio::spawn(actor.run(StudioContext::from_backend(mock.clone())));
    (client, handle)
}

fn ids(list: &[&str]) -> Vec<NodeId> {
    list.iter().map(|s| NodeId::from(*s)).collect()
}

/// Yields until the backend has received `count` calls.
async fn wait_for_calls(mock: &MockBackend, count: usize) {
    for _ in 0..1000 {
        if mock.calls().len() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("backend never received {count} calls: {:?}", mock.calls());
}

fn pending(outcome: ReorderOutcome) -> course_studio::studio::PendingReorder {
    match outcome {
        ReorderOutcome::Pending(pending) => pending,
        ReorderOutcome::Ignored(reason) => panic!("reorder was ignored: {reason}"),
    }
}

#[tokio::test]
async fn test_failed_path_reorder_is_rolled_back() {
    let mock = Arc::new(MockBackend::new());
    let mut expectation = mock.expect_reorder();
    let release = expectation.hold();
    expectation.return_err(ApiError::Status {
        status: 500,
        message: "boom".to_string(),
    });

    let (client, handle) = start(&mock);
    let paths = ListKey::paths("C");

    // Drag D over A
    let pending = pending(client.reorder_paths("C", "D", "A").await.unwrap());
    assert_eq!(pending.ordered_ids, ids(&["D", "A", "B"]));

    // The new order is visible before the backend answers
    let optimistic = client.snapshot().await.unwrap();
    assert_eq!(optimistic.ordered_ids(&paths), Some(ids(&["D", "A", "B"])));
    assert_eq!(optimistic.node(&"D".into()).unwrap().order_index(), 0);
    assert_eq!(optimistic.node(&"B".into()).unwrap().order_index(), 2);
    assert!(client.errors().await.unwrap().is_empty());

    release.release();
    let status = pending.settled().await;
    assert!(matches!(status, SyncStatus::RolledBack { .. }), "{status:?}");

    let restored = client.snapshot().await.unwrap();
    assert_eq!(restored.ordered_ids(&paths), Some(ids(&["A", "B", "D"])));
    assert_eq!(restored.node(&"D".into()).unwrap().order_index(), 2);

    // The snapshot taken during the optimistic window is unaffected
    assert_eq!(optimistic.ordered_ids(&paths), Some(ids(&["D", "A", "B"])));

    let errors = client.errors().await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].scope, ErrorScope::Reorder(paths.clone()));
    assert_eq!(
        errors[0].message,
        "Failed to update path order: API error 500: boom"
    );

    let requests = mock.reorder_requests();
    assert_eq!(requests, vec![ReorderRequest::new(&paths, ids(&["D", "A", "B"]))]);
    assert_eq!(
        serde_json::to_value(&requests[0]).unwrap(),
        json!({ "itemType": "path", "orderedIds": ["D", "A", "B"], "parentId": "C" })
    );

    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_section_reorder_commits_and_shares_untouched_lists() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_lessons("A")
        .return_ok(vec![Lesson::new("l1", "Counting", 0), Lesson::new("l2", "Place value", 1)]);
    mock.expect_fetch_sections("l1").return_ok(vec![
        Section::new("s1", "Intro", 0),
        Section::new("s2", "Practice", 1),
        Section::new("s3", "Quiz", 2),
    ]);
    mock.expect_reorder().return_ok();

    let (client, handle) = start(&mock);
    client.expand("A".into()).await.unwrap().settled().await;
    client.expand("l1".into()).await.unwrap().settled().await;
    client.select(SelectTarget::Node("s1".into())).await.unwrap();

    let before = client.snapshot().await.unwrap();
    let sections = ListKey::sections("l1");

    // Move s1 over s3
    let pending = pending(client.reorder_sections("l1", "s1", "s3").await.unwrap());
    assert_eq!(pending.ordered_ids, ids(&["s2", "s3", "s1"]));
    assert_eq!(pending.settled().await, SyncStatus::Committed);

    let after = client.snapshot().await.unwrap();
    assert_eq!(after.ordered_ids(&sections), Some(ids(&["s2", "s3", "s1"])));
    assert!(client.errors().await.unwrap().is_empty());

    // Only the reordered list was replaced
    let paths = ListKey::paths("C");
    let lessons = ListKey::lessons("A");
    assert!(Arc::ptr_eq(
        before.siblings(&paths).unwrap(),
        after.siblings(&paths).unwrap()
    ));
    assert!(Arc::ptr_eq(
        before.siblings(&lessons).unwrap(),
        after.siblings(&lessons).unwrap()
    ));
    assert!(!Arc::ptr_eq(
        before.siblings(&sections).unwrap(),
        after.siblings(&sections).unwrap()
    ));
    assert!(Arc::ptr_eq(
        before.node_arc(&"l1".into()).unwrap(),
        after.node_arc(&"l1".into()).unwrap()
    ));

    // The selected section follows its new position
    let selection = client.selection().await.unwrap();
    match selection.item {
        SelectedItem::Section(section) => assert_eq!(section.order_index, 2),
        other => panic!("unexpected selection: {other:?}"),
    }

    assert_eq!(
        mock.reorder_requests(),
        vec![ReorderRequest::new(&sections, ids(&["s2", "s3", "s1"]))]
    );
    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_invalid_drags_change_nothing() {
    let mock = Arc::new(MockBackend::new());
    let (client, handle) = start(&mock);
    let before = client.snapshot().await.unwrap();

    let cases = [
        (client.reorder_paths("C", "A", "A").await, IgnoreReason::SameItem),
        (client.reorder_paths("C", "zz", "A").await, IgnoreReason::ActiveNotFound),
        (client.reorder_paths("C", "A", "zz").await, IgnoreReason::OverNotFound),
        (client.reorder_lessons("A", "l1", "l2").await, IgnoreReason::ListNotLoaded),
    ];
    for (outcome, expected) in cases {
        match outcome.unwrap() {
            ReorderOutcome::Ignored(reason) => assert_eq!(reason, expected),
            ReorderOutcome::Pending(p) => panic!("expected {expected:?}, got pending {:?}", p.key),
        }
    }

    let after = client.snapshot().await.unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert!(client.errors().await.unwrap().is_empty());
    assert!(mock.calls().is_empty());

    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_stale_failure_does_not_undo_newer_reorder() {
    let mock = Arc::new(MockBackend::new());
    let mut first = mock.expect_reorder();
    let release_first = first.hold();
    first.return_err(ApiError::Status {
        status: 500,
        message: "boom".to_string(),
    });
    mock.expect_reorder().return_ok();

    let (client, handle) = start(&mock);
    let paths = ListKey::paths("C");

    let first = pending(client.reorder_paths("C", "D", "A").await.unwrap());
    wait_for_calls(&mock, 1).await;

    // [D, A, B] -> drag B over D
    let second = pending(client.reorder_paths("C", "B", "D").await.unwrap());
    assert!(second.seq > first.seq);
    assert_eq!(second.settled().await, SyncStatus::Committed);

    release_first.release();
    assert_eq!(first.settled().await, SyncStatus::Superseded);

    let tree = client.snapshot().await.unwrap();
    assert_eq!(tree.ordered_ids(&paths), Some(ids(&["B", "D", "A"])));
    assert!(client.errors().await.unwrap().is_empty());

    let requests = mock.reorder_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].ordered_ids, ids(&["B", "D", "A"]));

    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_rollback_of_one_list_keeps_newer_state_of_another() {
    let mock = Arc::new(MockBackend::new());
    mock.expect_fetch_lessons("A")
        .return_ok(vec![Lesson::new("l1", "Counting", 0), Lesson::new("l2", "Place value", 1)]);
    let mut lesson_reorder = mock.expect_reorder();
    let release = lesson_reorder.hold();
    lesson_reorder.return_err(ApiError::Network("connection reset".to_string()));
    mock.expect_reorder().return_ok();

    let (client, handle) = start(&mock);
    client.expand("A".into()).await.unwrap().settled().await;

    let lessons = ListKey::lessons("A");
    let failing = pending(client.reorder_lessons("A", "l2", "l1").await.unwrap());
    wait_for_calls(&mock, 2).await;
    let paths_move = pending(client.reorder_paths("C", "A", "D").await.unwrap());
    assert_eq!(paths_move.settled().await, SyncStatus::Committed);

    release.release();
    assert!(matches!(failing.settled().await, SyncStatus::RolledBack { .. }));

    let tree = client.snapshot().await.unwrap();
    assert_eq!(tree.ordered_ids(&lessons), Some(ids(&["l1", "l2"])));
    assert_eq!(tree.ordered_ids(&ListKey::paths("C")), Some(ids(&["B", "D", "A"])));

    let errors = client.errors().await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "Failed to update lesson order for path A: Network error: connection reset"
    );

    client.clear_errors().await.unwrap();
    assert!(client.errors().await.unwrap().is_empty());

    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_two_failures_restore_last_confirmed_order() {
    let mock = Arc::new(MockBackend::new());
    let mut first = mock.expect_reorder();
    let release_first = first.hold();
    first.return_err(ApiError::Status {
        status: 500,
        message: "first".to_string(),
    });
    let mut second = mock.expect_reorder();
    let release_second = second.hold();
    second.return_err(ApiError::Status {
        status: 500,
        message: "second".to_string(),
    });

    let (client, handle) = start(&mock);
    let paths = ListKey::paths("C");

    let first = pending(client.reorder_paths("C", "D", "A").await.unwrap());
    wait_for_calls(&mock, 1).await;
    let second = pending(client.reorder_paths("C", "B", "D").await.unwrap());
    wait_for_calls(&mock, 2).await;

    // The newest request fails first and falls back to the loaded order,
    // not to the first request's unconfirmed one
    release_second.release();
    assert!(matches!(second.settled().await, SyncStatus::RolledBack { .. }));
    let tree = client.snapshot().await.unwrap();
    assert_eq!(tree.ordered_ids(&paths), Some(ids(&["A", "B", "D"])));

    release_first.release();
    assert_eq!(first.settled().await, SyncStatus::Superseded);
    let tree = client.snapshot().await.unwrap();
    assert_eq!(tree.ordered_ids(&paths), Some(ids(&["A", "B", "D"])));
    assert_eq!(tree.node(&"D".into()).unwrap().order_index(), 2);

    let errors = client.errors().await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "Failed to update path order: API error 500: second"
    );

    mock.verify();
    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_older_success_after_newer_rollback_is_shown() {
    let mock = Arc::new(MockBackend::new());
    let mut first = mock.expect_reorder();
    let release_first = first.hold();
    first.return_ok();
    mock.expect_reorder().return_err(ApiError::Status {
        status: 500,
        message: "boom".to_string(),
    });

    let (client, handle) = start(&mock);
    let paths = ListKey::paths("C");

    let first = pending(client.reorder_paths("C", "D", "A").await.unwrap());
    wait_for_calls(&mock, 1).await;
    let second = pending(client.reorder_paths("C", "B", "D").await.unwrap());
    assert!(matches!(second.settled().await, SyncStatus::RolledBack { .. }));
    assert_eq!(
        client.snapshot().await.unwrap().ordered_ids(&paths),
        Some(ids(&["A", "B", "D"]))
    );

    // The backend stored the first order after all
    release_first.release();
    assert_eq!(first.settled().await, SyncStatus::Committed);
    assert_eq!(
        client.snapshot().await.unwrap().ordered_ids(&paths),
        Some(ids(&["D", "A", "B"]))
    );

    mock.verify();
    drop(client);
    handle.await.unwrap();
}
