mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use editor::{EditorError, PanelControl, NO_COLUMNS_REASON};
use parking_lot::Mutex;
use pipeline::{NodeKind, UploadResponse, UploadStatus};

#[tokio::test]
async fn test_upload_applies_columns_and_defaults_target_to_last() {
    let service = ScriptedService::new();
    service.push_columns(&["a", "b", "c"]);
    let session = empty_session(service.clone());
    select_new(&session, NodeKind::Dataset);

    let columns = session.panel().upload_file(csv()).await.unwrap();

    assert_eq!(columns, vec!["a", "b", "c"]);
    let config = session.config().snapshot();
    assert_eq!(config.columns, vec!["a", "b", "c"]);
    assert_eq!(config.target_column(), Some("c"));
    assert_eq!(session.panel().upload_status(), UploadStatus::Success);
    assert_eq!(service.upload_calls(), 1);
}

#[tokio::test]
async fn test_reupload_overwrites_manual_target_choice() {
    let service = ScriptedService::new();
    service.push_columns(&["a", "b", "c"]);
    service.push_columns(&["a", "b", "c"]);
    let session = empty_session(service.clone());
    select_new(&session, NodeKind::Dataset);

    session.panel().upload_file(csv()).await.unwrap();
    session.panel().select_target_column("a").unwrap();
    assert_eq!(session.config().snapshot().target_column(), Some("a"));

    session.panel().upload_file(csv()).await.unwrap();
    assert_eq!(session.config().snapshot().target_column(), Some("c"));
}

#[tokio::test]
async fn test_transport_failure_leaves_config_unchanged() {
    let service = ScriptedService::new();
    service.push_columns(&["x", "y"]);
    service.push_upload(Err(transport_error()));
    let session = empty_session(service.clone());
    select_new(&session, NodeKind::Dataset);
    session.panel().upload_file(csv()).await.unwrap();
    session.panel().select_target_column("x").unwrap();
    let before = session.config().snapshot();

    let err = session.panel().upload_file(csv()).await.unwrap_err();

    assert_eq!(err, EditorError::Service(transport_error()));
    assert_eq!(session.config().snapshot(), before);
    match session.panel().upload_status() {
        UploadStatus::Failed { reason } => assert!(reason.contains("connection refused"), "{reason}"),
        other => panic!("Expected Failed status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_column_list_is_a_failure() {
    let service = ScriptedService::new();
    service.push_upload(Ok(UploadResponse { columns: None }));
    let session = empty_session(service.clone());
    select_new(&session, NodeKind::Dataset);

    let err = session.panel().upload_file(csv()).await.unwrap_err();

    assert_eq!(err, EditorError::MissingColumns);
    assert_eq!(
        session.panel().upload_status(),
        UploadStatus::Failed {
            reason: NO_COLUMNS_REASON.to_string()
        }
    );
    assert!(session.config().snapshot().columns.is_empty());
}

#[tokio::test]
async fn test_empty_column_list_is_accepted_and_clears_target() {
    let service = ScriptedService::new();
    service.push_columns(&["a", "b"]);
    service.push_upload(Ok(UploadResponse {
        columns: Some(Vec::new()),
    }));
    let session = empty_session(service.clone());
    select_new(&session, NodeKind::Dataset);
    session.panel().upload_file(csv()).await.unwrap();

    let columns = session.panel().upload_file(csv()).await.unwrap();

    assert!(columns.is_empty());
    assert_eq!(session.panel().upload_status(), UploadStatus::Success);
    let config = session.config().snapshot();
    assert!(config.columns.is_empty());
    assert_eq!(config.target_column(), None);
}

#[tokio::test]
async fn test_reupload_publishes_one_consistent_config_change() {
    let service = ScriptedService::new();
    service.push_columns(&["a", "b", "c"]);
    service.push_columns(&["x", "y"]);
    let session = empty_session(service.clone());
    select_new(&session, NodeKind::Dataset);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.config().subscribe(move |event| {
        let config = &event.config;
        sink.lock()
            .push((config.columns.clone(), config.target_column.clone()));
    });

    session.panel().upload_file(csv()).await.unwrap();
    session.panel().upload_file(csv()).await.unwrap();

    let strings = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
    assert_eq!(
        *seen.lock(),
        vec![
            (strings(&["a", "b", "c"]), Some("c".to_string())),
            (strings(&["x", "y"]), Some("y".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_dropped_upload_returns_status_to_idle() {
    let service = ScriptedService::new();
    let _release = service.hold_next_upload();
    service.push_columns(&["a", "b"]);
    service.push_columns(&["c", "d"]);
    let session = empty_session(service.clone());
    select_new(&session, NodeKind::Dataset);

    let outcome =
        tokio::time::timeout(Duration::from_millis(20), session.panel().upload_file(csv())).await;

    assert!(outcome.is_err());
    assert_eq!(session.panel().upload_status(), UploadStatus::Idle);
    assert!(session.config().snapshot().columns.is_empty());

    // The abandoned response is still queued; the next upload consumes it.
    session.panel().upload_file(csv()).await.unwrap();
    assert_eq!(session.panel().upload_status(), UploadStatus::Success);
}

#[tokio::test]
async fn test_upload_requires_dataset_selection() {
    let service = ScriptedService::new();
    let session = empty_session(service.clone());

    let err = session.panel().upload_file(csv()).await.unwrap_err();
    assert_eq!(
        err,
        EditorError::ControlUnavailable {
            control: PanelControl::Upload,
            selected: None,
        }
    );

    select_new(&session, NodeKind::Split);
    let err = session.panel().upload_file(csv()).await.unwrap_err();
    assert_eq!(
        err,
        EditorError::ControlUnavailable {
            control: PanelControl::Upload,
            selected: Some(NodeKind::Split),
        }
    );
    assert_eq!(service.upload_calls(), 0);
    assert_eq!(session.panel().upload_status(), UploadStatus::Idle);
}

#[tokio::test]
async fn test_status_observers_see_uploading_then_outcome() {
    let service = ScriptedService::new();
    service.push_columns(&["only"]);
    service.push_upload(Err(transport_error()));
    let session = empty_session(service.clone());
    select_new(&session, NodeKind::Dataset);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session
        .panel()
        .uploader()
        .subscribe(move |status| sink.lock().push(status.clone()));

    session.panel().upload_file(csv()).await.unwrap();
    let _ = session.panel().upload_file(csv()).await;

    let seen = seen.lock();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0], UploadStatus::Uploading);
    assert_eq!(seen[1], UploadStatus::Success);
    assert_eq!(seen[2], UploadStatus::Uploading);
    assert!(seen[3].is_failure());
}
