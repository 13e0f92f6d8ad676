//! Shared fixtures: a scripted `TrainingService` and session helpers.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use editor::{EditorOptions, EditorSession};
use parking_lot::Mutex;
use pipeline::{
    palette_entry, DatasetFile, Node, NodeKind, Position, RunRequest, RunResult, ServiceError,
    TrainingService, UploadResponse,
};
use tokio::sync::{oneshot, Notify};

/// A `TrainingService` that replays queued responses and records calls.
///
/// `hold_next_run` / `hold_next_upload` make the next call wait until the
/// returned sender fires, so tests can act while a request is in flight.
#[derive(Default)]
pub struct ScriptedService {
    uploads: Mutex<VecDeque<Result<UploadResponse, ServiceError>>>,
    runs: Mutex<VecDeque<Result<RunResult, ServiceError>>>,
    upload_hold: Mutex<Option<oneshot::Receiver<()>>>,
    run_hold: Mutex<Option<oneshot::Receiver<()>>>,
    upload_calls: AtomicUsize,
    run_calls: AtomicUsize,
    pub run_requests: Mutex<Vec<RunRequest>>,
    pub upload_started: Notify,
    pub run_started: Notify,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_upload(&self, response: Result<UploadResponse, ServiceError>) {
        self.uploads.lock().push_back(response);
    }

    pub fn push_columns(&self, columns: &[&str]) {
        self.push_upload(Ok(UploadResponse {
            columns: Some(columns.iter().map(|c| c.to_string()).collect()),
        }));
    }

    pub fn push_run(&self, response: Result<RunResult, ServiceError>) {
        self.runs.lock().push_back(response);
    }

    pub fn hold_next_run(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.run_hold.lock() = Some(rx);
        tx
    }

    pub fn hold_next_upload(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.upload_hold.lock() = Some(rx);
        tx
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrainingService for ScriptedService {
    async fn upload_dataset(&self, _file: DatasetFile) -> Result<UploadResponse, ServiceError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.upload_started.notify_one();
        let hold = self.upload_hold.lock().take();
        if let Some(rx) = hold {
            let _ = rx.await;
        }
        self.uploads
            .lock()
            .pop_front()
            .expect("no scripted upload response")
    }

    async fn run_pipeline(&self, request: &RunRequest) -> Result<RunResult, ServiceError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        self.run_requests.lock().push(request.clone());
        self.run_started.notify_one();
        let hold = self.run_hold.lock().take();
        if let Some(rx) = hold {
            let _ = rx.await;
        }
        self.runs
            .lock()
            .pop_front()
            .expect("no scripted run response")
    }
}

pub fn sample_result() -> RunResult {
    RunResult {
        status: "ok".to_string(),
        accuracy: 91.5,
        confusion_matrix: vec![vec![10, 1], vec![2, 9]],
    }
}

pub fn csv() -> DatasetFile {
    DatasetFile::new("iris.csv", "a,b,c\n1,2,3\n")
}

pub fn transport_error() -> ServiceError {
    ServiceError::Transport {
        message: "connection refused".to_string(),
    }
}

/// A session without the seed node, so the graph starts empty.
pub fn empty_session(service: Arc<ScriptedService>) -> EditorSession {
    EditorSession::new(
        service,
        EditorOptions {
            seed_dataset_node: false,
            ..EditorOptions::default()
        },
    )
}

/// Drags `kind` from the palette and drops it at `(x, y)`.
pub fn drop_node(session: &EditorSession, kind: NodeKind, x: f64, y: f64) -> Node {
    session.begin_drag(palette_entry(kind).drag_payload());
    session
        .complete_drop(Position::new(x, y))
        .expect("drop with an active payload creates a node")
}

/// Drops a node of `kind` and selects it.
pub fn select_new(session: &EditorSession, kind: NodeKind) -> Node {
    let node = drop_node(session, kind, 0.0, 0.0);
    session.select_node(&node.id).unwrap();
    node
}
