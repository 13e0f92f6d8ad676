//! Core domain for the ML pipeline canvas.
//!
//! This crate contains the graph model, the shared pipeline configuration
//! store, the node palette and drag protocol, and the port trait through which
//! the editor reaches the remote training service. Infrastructure crates
//! implement the port; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! All state is interior-mutable behind short, non-async critical sections so
//! that in-flight service calls never block edits.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `NodeId`, `SessionId` |
//! | [`types`] | Node kinds, geometry, pipeline parameters, run/upload outcomes |
//! | [`errors`] | Store, graph and service error types |
//! | [`observers`] | Subscriber lists used for view notification |
//! | [`config`] | `PipelineConfigStore` and its single update entry point |
//! | [`graph`] | `GraphModel`: nodes, edges, selection, view transform |
//! | [`palette`] | Palette catalog and the two-phase drag session |
//! | [`ports`] | `TrainingService` and its request/response types |

pub mod config;
pub mod errors;
pub mod graph;
pub mod identifiers;
pub mod observers;
pub mod palette;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{ConfigEvent, ConfigField, ConfigUpdate, PipelineConfig, PipelineConfigStore};
pub use errors::{ConfigError, GraphError, ServiceError};
pub use graph::{Edge, GraphEvent, GraphModel, Node};
pub use identifiers::{NodeId, SessionId};
pub use observers::{SubscriptionId, Subscribers};
pub use palette::{palette_entry, DragPayload, DragSession, PaletteEntry, PALETTE};
pub use ports::{DatasetFile, RunRequest, TrainingService, UploadResponse};
pub use types::{
    ModelType, NodeKind, Notice, NoticeLevel, Position, PreprocessingMethod, RunResult,
    SplitRatio, Timestamp, UploadStatus, ViewTransform,
};
