//! Error types for the ML canvas domain.
//!
//! [`ConfigError`] and [`GraphError`] are invariant violations detected by the
//! config store and graph model; the rejected write leaves state unchanged.
//! [`ServiceError`] is produced by [`crate::TrainingService`] implementations
//! and covers every way a remote call can fail. None of these are fatal to an
//! editing session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::NodeId;

// ---------------------------------------------------------------------------
// Config store errors
// ---------------------------------------------------------------------------

/// A write rejected by the pipeline config store.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ConfigError {
    /// The requested split ratio lies outside `[0.1, 0.9]`.
    #[error("Split ratio {value} is outside [0.1, 0.9]")]
    SplitRatioOutOfRange {
        /// The rejected value.
        value: f64,
    },

    /// The requested target column is not one of the loaded columns.
    #[error("Unknown target column '{column}'")]
    UnknownColumn {
        /// The rejected column name.
        column: String,
    },
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

/// A graph operation rejected by the graph model.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum GraphError {
    /// An operation referenced a node that does not exist in this session.
    #[error("Node not found: {id}")]
    UnknownNode {
        /// The missing node id.
        id: NodeId,
    },

    /// A node with this id already exists in the session.
    #[error("Node already exists: {id}")]
    DuplicateNode {
        /// The conflicting node id.
        id: NodeId,
    },

    /// The canvas reported a pan/zoom state that cannot map coordinates.
    #[error("Invalid view transform: offset ({offset_x}, {offset_y}), zoom {zoom}")]
    InvalidViewTransform {
        /// Reported horizontal offset.
        offset_x: f64,
        /// Reported vertical offset.
        offset_y: f64,
        /// Reported zoom factor.
        zoom: f64,
    },
}

// ---------------------------------------------------------------------------
// Training service errors
// ---------------------------------------------------------------------------

/// Failure of a call to the upload or run endpoint.
///
/// Transport failures, non-success responses and malformed bodies are all
/// handled the same way by callers: surfaced to the user, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ServiceError {
    /// The request could not be delivered or the response could not be read.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the underlying failure.
        message: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The endpoint answered successfully but the body lacks expected fields.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// What was missing or unparseable.
        message: String,
    },
}
