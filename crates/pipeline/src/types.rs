//! Shared value types for the ML canvas domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (split ratios live in `[0.1, 0.9]`, zoom
//! factors are strictly positive) and cross the boundary to the training
//! service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

/// The stage a node represents in the pipeline graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Dataset upload; the source of column names.
    Dataset,
    /// Feature scaling.
    Preprocess,
    /// Train/test partitioning.
    Split,
    /// Model training and the Run control.
    Model,
}

impl NodeKind {
    /// Every kind, in palette order.
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Dataset,
        NodeKind::Preprocess,
        NodeKind::Split,
        NodeKind::Model,
    ];

    /// Returns the kind's wire/type name (`"dataset"`, `"preprocess"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Dataset => "dataset",
            NodeKind::Preprocess => "preprocess",
            NodeKind::Split => "split",
            NodeKind::Model => "model",
        }
    }

    /// Human-readable label used by the palette and the seed node.
    pub fn default_label(self) -> &'static str {
        match self {
            NodeKind::Dataset => "Dataset Upload",
            NodeKind::Preprocess => "Preprocessing",
            NodeKind::Split => "Train-Test Split",
            NodeKind::Model => "Model Training",
        }
    }

    /// Whether the canvas renders an incoming connection handle for this kind.
    ///
    /// Dataset nodes are pipeline sources and take no input.
    pub fn has_input_handle(self) -> bool {
        !matches!(self, NodeKind::Dataset)
    }

    /// Whether the canvas renders an outgoing connection handle for this kind.
    pub fn has_output_handle(self) -> bool {
        true
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point, either in screen space or in canvas space depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Creates a new [`Position`].
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pan/zoom state reported by the canvas component.
///
/// Maps screen coordinates onto the canvas: `canvas = (screen - offset) / zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    offset_x: f64,
    offset_y: f64,
    zoom: f64,
}

impl ViewTransform {
    /// The identity transform (no pan, zoom 1).
    pub const IDENTITY: ViewTransform = ViewTransform {
        offset_x: 0.0,
        offset_y: 0.0,
        zoom: 1.0,
    };

    /// Creates a transform, returning `None` unless every component is finite
    /// and `zoom` is strictly positive.
    #[must_use]
    pub fn new(offset_x: f64, offset_y: f64, zoom: f64) -> Option<Self> {
        if offset_x.is_finite() && offset_y.is_finite() && zoom.is_finite() && zoom > 0.0 {
            Some(Self {
                offset_x,
                offset_y,
                zoom,
            })
        } else {
            None
        }
    }

    /// Converts a screen-space point into canvas space.
    pub fn screen_to_canvas(&self, screen: Position) -> Position {
        Position {
            x: (screen.x - self.offset_x) / self.zoom,
            y: (screen.y - self.offset_y) / self.zoom,
        }
    }

    /// Returns the zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ---------------------------------------------------------------------------
// Pipeline parameters
// ---------------------------------------------------------------------------

/// Fraction of the dataset allocated to the training partition.
///
/// Always within `[SplitRatio::MIN, SplitRatio::MAX]`; there is no way to
/// construct a value outside that interval.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SplitRatio(f64);

impl SplitRatio {
    /// Smallest permitted ratio.
    pub const MIN: f64 = 0.1;
    /// Largest permitted ratio.
    pub const MAX: f64 = 0.9;
    /// Slider step.
    pub const STEP: f64 = 0.1;

    /// Creates a [`SplitRatio`], returning `None` if `value` is outside
    /// `[0.1, 0.9]` or not finite.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Creates a [`SplitRatio`] from a slider position, snapping to the
    /// nearest step.
    ///
    /// Returns `None` when the raw value is out of range; snapping never moves
    /// an in-range value out of range.
    #[must_use]
    pub fn from_slider(value: f64) -> Option<Self> {
        Self::new(value)?;
        // Dividing whole steps by 10 keeps 0.3 as 0.3 rather than 0.30000000000000004.
        let steps = (value / Self::STEP).round();
        Some(Self((steps / 10.0).clamp(Self::MIN, Self::MAX)))
    }

    /// Returns the ratio as an `f64`.
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl Default for SplitRatio {
    fn default() -> Self {
        Self(0.8)
    }
}

impl TryFrom<f64> for SplitRatio {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("split ratio {value} outside [0.1, 0.9]"))
    }
}

impl From<SplitRatio> for f64 {
    fn from(ratio: SplitRatio) -> Self {
        ratio.0
    }
}

impl std::fmt::Display for SplitRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Feature scaling applied before training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PreprocessingMethod {
    /// Zero mean, unit variance.
    #[default]
    StandardScaler,
    /// Rescale to `[0, 1]`.
    MinMaxScaler,
}

impl PreprocessingMethod {
    /// Selector options, in display order.
    pub const ALL: [PreprocessingMethod; 2] = [
        PreprocessingMethod::StandardScaler,
        PreprocessingMethod::MinMaxScaler,
    ];

    /// Value sent in the `preprocessing` form field.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            PreprocessingMethod::StandardScaler => "StandardScaler",
            PreprocessingMethod::MinMaxScaler => "MinMaxScaler",
        }
    }
}

impl std::fmt::Display for PreprocessingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

impl std::str::FromStr for PreprocessingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_wire_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown preprocessing method '{s}'"))
    }
}

// ---------------------------------------------------------------------------

/// Classifier trained by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelType {
    /// Logistic regression.
    #[default]
    #[serde(rename = "Logistic Regression")]
    LogisticRegression,
    /// Decision tree.
    #[serde(rename = "Decision Tree")]
    DecisionTree,
}

impl ModelType {
    /// Selector options, in display order.
    pub const ALL: [ModelType; 2] = [ModelType::LogisticRegression, ModelType::DecisionTree];

    /// Value sent in the `model_type` form field.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            ModelType::LogisticRegression => "Logistic Regression",
            ModelType::DecisionTree => "Decision Tree",
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

impl std::str::FromStr for ModelType {
    type Err = String;

    /// Accepts the wire form (`"Decision Tree"`) or the compact form
    /// (`"DecisionTree"`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        Self::ALL
            .into_iter()
            .find(|m| m.as_wire_str().replace(' ', "").eq_ignore_ascii_case(&compact))
            .ok_or_else(|| format!("unknown model type '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Run outcome
// ---------------------------------------------------------------------------

/// Outcome of a successful training run, as returned by the run endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Service-reported status string (e.g. `"ok"`).
    pub status: String,
    /// Test-set accuracy, as a percentage.
    pub accuracy: f64,
    /// Confusion matrix, row-major.
    pub confusion_matrix: Vec<Vec<i64>>,
}

// ---------------------------------------------------------------------------
// Upload status
// ---------------------------------------------------------------------------

/// Display-only progress of the most recent dataset upload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadStatus {
    /// No upload attempted yet.
    #[default]
    Idle,
    /// A request is in flight.
    Uploading,
    /// Columns were received and applied.
    Success,
    /// The upload failed; the configuration was left unchanged.
    Failed {
        /// Human-readable cause.
        reason: String,
    },
}

impl UploadStatus {
    /// Status line shown beneath the upload control, or `None` when idle.
    pub fn message(&self) -> Option<String> {
        match self {
            UploadStatus::Idle => None,
            UploadStatus::Uploading => Some("Uploading...".to_string()),
            UploadStatus::Success => Some("Success! File loaded.".to_string()),
            UploadStatus::Failed { reason } => Some(format!("Error: {reason}")),
        }
    }

    /// Returns `true` for [`UploadStatus::Failed`].
    pub fn is_failure(&self) -> bool {
        matches!(self, UploadStatus::Failed { .. })
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// Severity of a user-facing [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// The action was blocked; the user can fix the input and retry.
    Warning,
    /// A remote call failed.
    Error,
}

/// A message surfaced to the user (the banner or alert of a front end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub message: String,
    /// When the notice was raised.
    pub at: Timestamp,
}

impl Notice {
    /// Creates a warning stamped with the current time.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
            at: Timestamp::now(),
        }
    }

    /// Creates an error stamped with the current time.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            at: Timestamp::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
