//! Run orchestrator: validates the pipeline configuration, submits it to the
//! run endpoint, and holds the outcome for display.
//!
//! ```text
//! Idle ──run()──▶ Validating ──no target──▶ Idle (warning, no request)
//!                     │
//!                     ▼
//!                 Submitted ──▶ Succeeded | Failed   (both idle states)
//! ```
//!
//! A busy flag is held from `run()` entry until the request resolves; a
//! second `run()` in that window is rejected without sending anything. Failed
//! runs are never retried. A run future dropped while `Submitted` returns the
//! phase to `Idle`.

use std::sync::Arc;

use parking_lot::Mutex;
use pipeline::{
    Notice, PipelineConfigStore, RunRequest, RunResult, SessionId, SubscriptionId, Subscribers,
    TrainingService,
};
use tracing::{error, info, instrument, warn};

use crate::gate::{BusyFlag, OnCancel};
use crate::RunError;

/// Warning raised when a run is attempted without a target column.
pub const MISSING_TARGET_WARNING: &str = "Please go back to the Dataset node and upload a file first.";

/// Lifecycle position of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// No run attempted yet, or the last attempt was rejected by validation.
    #[default]
    Idle,
    /// Checking the configuration.
    Validating,
    /// A request is in flight.
    Submitted,
    /// The last run produced a result.
    Succeeded,
    /// The last run failed.
    Failed {
        /// Human-readable cause.
        reason: String,
    },
}

impl RunPhase {
    /// Returns `true` unless validating or awaiting a response.
    pub fn is_idle(&self) -> bool {
        !matches!(self, RunPhase::Validating | RunPhase::Submitted)
    }
}

/// Published as a run progresses.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Validation rejected the run; no request was sent.
    Rejected(Notice),
    /// A request was sent.
    Submitted(RunRequest),
    /// The run produced a result.
    Succeeded(RunResult),
    /// The request failed.
    Failed(Notice),
}

#[derive(Debug, Default)]
struct RunState {
    phase: RunPhase,
    result: Option<RunResult>,
    last_notice: Option<Notice>,
}

/// Drives training runs for one session.
pub struct RunOrchestrator {
    session: SessionId,
    store: Arc<PipelineConfigStore>,
    service: Arc<dyn TrainingService>,
    busy: BusyFlag,
    state: Mutex<RunState>,
    subscribers: Subscribers<RunEvent>,
}

impl RunOrchestrator {
    /// Creates an orchestrator gated by `busy`.
    pub fn new(
        session: SessionId,
        store: Arc<PipelineConfigStore>,
        service: Arc<dyn TrainingService>,
        busy: BusyFlag,
    ) -> Self {
        Self {
            session,
            store,
            service,
            busy,
            state: Mutex::new(RunState::default()),
            subscribers: Subscribers::new(),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RunPhase {
        self.state.lock().phase.clone()
    }

    /// Result of the last successful run, cleared when a new run is submitted.
    pub fn result(&self) -> Option<RunResult> {
        self.state.lock().result.clone()
    }

    /// Most recent warning or failure shown to the user; cleared when a new
    /// request is submitted.
    pub fn last_notice(&self) -> Option<Notice> {
        self.state.lock().last_notice.clone()
    }

    /// Returns `true` while a request holds the gate.
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Registers an observer for run progress.
    pub fn subscribe(&self, callback: impl Fn(&RunEvent) + Send + Sync + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    fn set_phase(&self, phase: RunPhase) {
        self.state.lock().phase = phase;
    }

    fn raise(&self, notice: Notice) {
        self.state.lock().last_notice = Some(notice);
    }

    /// Validates the current configuration and submits it.
    #[instrument(skip(self), fields(session = %self.session))]
    pub async fn run(&self) -> Result<RunResult, RunError> {
        let Some(_guard) = self.busy.try_acquire() else {
            warn!("Run rejected: a request is already in flight");
            return Err(RunError::Busy);
        };

        self.set_phase(RunPhase::Validating);
        let config = self.store.snapshot();
        let Some(request) = RunRequest::from_config(&config) else {
            warn!("Run rejected: no target column selected");
            let notice = Notice::warning(MISSING_TARGET_WARNING);
            self.raise(notice.clone());
            self.set_phase(RunPhase::Idle);
            self.subscribers.notify(&RunEvent::Rejected(notice));
            return Err(RunError::MissingTargetColumn);
        };

        {
            let mut state = self.state.lock();
            state.result = None;
            state.last_notice = None;
            state.phase = RunPhase::Submitted;
        }
        info!(
            target_column = %request.target_column,
            split_ratio = %request.split_ratio,
            preprocessing = %request.preprocessing,
            model_type = %request.model_type,
            "Submitting pipeline run"
        );
        self.subscribers.notify(&RunEvent::Submitted(request.clone()));

        let pending = OnCancel::new(|| {
            warn!("Run dropped before the service answered");
            self.set_phase(RunPhase::Idle);
        });
        let response = self.service.run_pipeline(&request).await;
        pending.disarm();

        match response {
            Ok(result) => {
                info!(status = %result.status, accuracy = result.accuracy, "Pipeline run succeeded");
                {
                    let mut state = self.state.lock();
                    state.result = Some(result.clone());
                    state.phase = RunPhase::Succeeded;
                }
                self.subscribers.notify(&RunEvent::Succeeded(result.clone()));
                Ok(result)
            }
            Err(e) => {
                error!(error = %e, "Pipeline run failed");
                let notice = Notice::error(format!("Pipeline run failed: {e}"));
                {
                    let mut state = self.state.lock();
                    state.phase = RunPhase::Failed {
                        reason: e.to_string(),
                    };
                    state.last_notice = Some(notice.clone());
                }
                self.subscribers.notify(&RunEvent::Failed(notice));
                Err(RunError::Service(e))
            }
        }
    }
}

impl std::fmt::Debug for RunOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOrchestrator")
            .field("session", &self.session)
            .field("busy", &self.busy.is_busy())
            .field("state", &*self.state.lock())
            .finish()
    }
}
