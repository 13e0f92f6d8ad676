//! Error types for the editor orchestration layer.
//!
//! [`RunError`] covers the run orchestrator's three outcomes other than
//! success. [`EditorError`] wraps everything a panel or session action can
//! reject with. After any of these the session remains fully usable.

use pipeline::{ConfigError, GraphError, NodeKind, ServiceError};
use thiserror::Error;

use crate::panel::PanelControl;

/// Why a run did not produce a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    /// Validation failed: no target column is set. No request was sent.
    #[error("No target column selected; upload a dataset first")]
    MissingTargetColumn,

    /// A run (or, under the serialized policy, an upload) is already in
    /// flight. No request was sent.
    #[error("A request is already in flight")]
    Busy,

    /// The run endpoint failed or returned a malformed response.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Rejection of a panel or session action.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// The control is not exposed for the current selection.
    #[error("{control} is not available while {}", describe_selection(.selected))]
    ControlUnavailable {
        /// The control the caller tried to use.
        control: PanelControl,
        /// Kind of the selected node, if any.
        selected: Option<NodeKind>,
    },

    /// Under the serialized concurrency policy, another request is in flight.
    #[error("Another request is already in flight")]
    RequestInFlight,

    /// The upload endpoint answered without a usable column list.
    #[error("Backend returned no columns")]
    MissingColumns,

    /// The upload endpoint failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The config store rejected the write.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The graph model rejected the operation.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The run did not produce a result.
    #[error(transparent)]
    Run(#[from] RunError),
}

fn describe_selection(selected: &Option<NodeKind>) -> String {
    match selected {
        Some(kind) => format!("a {kind} node is selected"),
        None => "no node is selected".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            EditorError::ControlUnavailable {
                control: PanelControl::SplitRatio,
                selected: Some(NodeKind::Model),
            }
            .to_string(),
            "split ratio is not available while a model node is selected"
        );
        assert_eq!(
            EditorError::ControlUnavailable {
                control: PanelControl::Run,
                selected: None,
            }
            .to_string(),
            "run is not available while no node is selected"
        );
        assert_eq!(
            EditorError::from(RunError::Service(ServiceError::Transport {
                message: "connection refused".to_string()
            }))
            .to_string(),
            "Transport error: connection refused"
        );
    }
}
