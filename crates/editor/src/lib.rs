//! ML canvas editor orchestration.
//!
//! This crate sequences user actions against the [`pipeline`] domain: the
//! selection-driven configuration panel, the dataset upload flow, the run
//! orchestrator, and the [`EditorSession`] that composes them for one canvas.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Components here call the config store, the graph
//! model and the [`pipeline::TrainingService`] port. They contain no transport
//! code; `ml-service` provides the HTTP implementation of the port.
//!
//! ## Concurrency
//!
//! Every action takes `&self`. Upload and run are `async` and may be polled
//! concurrently with each other and with synchronous edits; the Run busy flag
//! rejects re-entrant runs, and [`ConcurrencyPolicy::Serialized`] extends that
//! gate to uploads.

pub mod errors;
pub mod gate;
pub mod orchestrator;
pub mod panel;
pub mod session;
pub mod upload;

pub use errors::{EditorError, RunError};
pub use gate::{BusyFlag, BusyGuard, ConcurrencyPolicy};
pub use orchestrator::{RunEvent, RunOrchestrator, RunPhase, MISSING_TARGET_WARNING};
pub use panel::{ConfigurationPanel, PanelControl, PanelSection, PanelView, NO_TARGET_LABEL, PLACEHOLDER};
pub use session::{EditorOptions, EditorSession, SEED_POSITION};
pub use upload::{DatasetUploader, NO_COLUMNS_REASON};
