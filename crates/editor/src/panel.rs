//! Configuration panel: a selection-driven form over the pipeline config store.
//!
//! The selected node's kind decides which controls exist. Every control writes
//! through to the shared [`PipelineConfigStore`] immediately via
//! [`PipelineConfigStore::apply_update`]; the panel keeps no copy of the
//! configuration. Using a control that the current selection does not expose
//! is rejected with [`EditorError::ControlUnavailable`].
//!
//! [`ConfigurationPanel::view`] produces a render-ready [`PanelView`] for a
//! front end.

use std::sync::Arc;

use pipeline::{
    ConfigUpdate, DatasetFile, GraphModel, ModelType, Node, NodeKind, PipelineConfigStore,
    Notice, PreprocessingMethod, RunResult, SplitRatio, UploadStatus,
};
use serde::Serialize;
use tracing::debug;

use crate::orchestrator::{RunOrchestrator, RunPhase};
use crate::upload::DatasetUploader;
use crate::EditorError;

/// Text shown when nothing is selected.
pub const PLACEHOLDER: &str = "Select a node to configure it.";

/// Shown in place of the target column on the Model section when none is set.
pub const NO_TARGET_LABEL: &str = "⚠️ No Target Selected";

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// A control exposed by one of the panel's sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelControl {
    /// Dataset file picker.
    Upload,
    /// Target column selector (Dataset section, once columns are loaded).
    TargetColumn,
    /// Split ratio slider.
    SplitRatio,
    /// Preprocessing selector.
    Preprocessing,
    /// Model type selector.
    ModelType,
    /// Run button (Model section).
    Run,
}

impl PanelControl {
    /// The node kind whose section exposes this control.
    pub fn section(self) -> NodeKind {
        match self {
            PanelControl::Upload | PanelControl::TargetColumn => NodeKind::Dataset,
            PanelControl::SplitRatio => NodeKind::Split,
            PanelControl::Preprocessing => NodeKind::Preprocess,
            PanelControl::ModelType | PanelControl::Run => NodeKind::Model,
        }
    }
}

impl std::fmt::Display for PanelControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PanelControl::Upload => "upload",
            PanelControl::TargetColumn => "target column",
            PanelControl::SplitRatio => "split ratio",
            PanelControl::Preprocessing => "preprocessing",
            PanelControl::ModelType => "model type",
            PanelControl::Run => "run",
        })
    }
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// Render-ready description of the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    /// Panel heading.
    pub title: String,
    /// Controls for the selected node kind.
    pub section: PanelSection,
    /// Latest run result; shown whenever a node is selected.
    pub results: Option<RunResult>,
    /// Status line: the last run warning or failure, shown whenever a node is
    /// selected.
    pub notice: Option<Notice>,
}

/// The controls of one panel state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelSection {
    /// Nothing selected.
    Placeholder {
        /// Hint text.
        message: &'static str,
    },
    /// Dataset node selected.
    Dataset {
        /// Progress of the most recent upload.
        upload_status: UploadStatus,
        /// Status line, if any.
        status_message: Option<String>,
        /// Options of the target selector; the selector is hidden while empty.
        columns: Vec<String>,
        /// Selected target column.
        target_column: Option<String>,
    },
    /// Split node selected.
    Split {
        /// Current ratio.
        value: SplitRatio,
        /// Slider minimum.
        min: f64,
        /// Slider maximum.
        max: f64,
        /// Slider step.
        step: f64,
    },
    /// Preprocess node selected.
    Preprocess {
        /// Current method.
        selected: PreprocessingMethod,
        /// Selector options.
        options: [PreprocessingMethod; 2],
    },
    /// Model node selected.
    Model {
        /// Current model type.
        selected: ModelType,
        /// Selector options.
        options: [ModelType; 2],
        /// Target column, or [`NO_TARGET_LABEL`].
        target_label: String,
        /// Whether a target column is set.
        has_target: bool,
        /// `true` while the Run control is disabled.
        run_busy: bool,
    },
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// The configuration panel of one session.
#[derive(Debug)]
pub struct ConfigurationPanel {
    graph: Arc<GraphModel>,
    store: Arc<PipelineConfigStore>,
    uploader: DatasetUploader,
    orchestrator: RunOrchestrator,
}

impl ConfigurationPanel {
    /// Creates a panel reading the selection from `graph` and writing to `store`.
    pub fn new(
        graph: Arc<GraphModel>,
        store: Arc<PipelineConfigStore>,
        uploader: DatasetUploader,
        orchestrator: RunOrchestrator,
    ) -> Self {
        Self {
            graph,
            store,
            uploader,
            orchestrator,
        }
    }

    /// The dataset upload flow.
    pub fn uploader(&self) -> &DatasetUploader {
        &self.uploader
    }

    /// The run orchestrator.
    pub fn orchestrator(&self) -> &RunOrchestrator {
        &self.orchestrator
    }

    /// Current upload status.
    pub fn upload_status(&self) -> UploadStatus {
        self.uploader.status()
    }

    /// Latest run result.
    pub fn run_result(&self) -> Option<RunResult> {
        self.orchestrator.result()
    }

    /// Current run phase.
    pub fn run_phase(&self) -> RunPhase {
        self.orchestrator.phase()
    }

    /// Builds the view for the current selection.
    pub fn view(&self) -> PanelView {
        let Some(node) = self.graph.selected_node() else {
            return PanelView {
                title: "Properties".to_string(),
                section: PanelSection::Placeholder {
                    message: PLACEHOLDER,
                },
                results: None,
                notice: None,
            };
        };

        let config = self.store.snapshot();
        let section = match node.kind {
            NodeKind::Dataset => {
                let upload_status = self.uploader.status();
                PanelSection::Dataset {
                    status_message: upload_status.message(),
                    upload_status,
                    target_column: config.target_column().map(str::to_string),
                    columns: config.columns,
                }
            }
            NodeKind::Split => PanelSection::Split {
                value: config.split_ratio,
                min: SplitRatio::MIN,
                max: SplitRatio::MAX,
                step: SplitRatio::STEP,
            },
            NodeKind::Preprocess => PanelSection::Preprocess {
                selected: config.preprocessing,
                options: PreprocessingMethod::ALL,
            },
            NodeKind::Model => PanelSection::Model {
                selected: config.model_type,
                options: ModelType::ALL,
                target_label: config
                    .target_column()
                    .unwrap_or(NO_TARGET_LABEL)
                    .to_string(),
                has_target: config.target_column().is_some(),
                run_busy: self.orchestrator.is_busy(),
            },
        };

        PanelView {
            title: format!("Configure: {}", node.label),
            section,
            results: self.orchestrator.result(),
            notice: self.orchestrator.last_notice(),
        }
    }

    fn require(&self, control: PanelControl) -> Result<Node, EditorError> {
        let selected = self.graph.selected_node();
        match selected {
            Some(node) if node.kind == control.section() => Ok(node),
            other => Err(EditorError::ControlUnavailable {
                control,
                selected: other.map(|n| n.kind),
            }),
        }
    }

    fn write(&self, update: ConfigUpdate) -> Result<(), EditorError> {
        debug!(field = ?update.field(), "Panel write");
        self.store.apply_update(update)?;
        Ok(())
    }

    /// Dataset section: uploads `file` and applies the returned columns.
    pub async fn upload_file(&self, file: DatasetFile) -> Result<Vec<String>, EditorError> {
        self.require(PanelControl::Upload)?;
        self.uploader.upload(file).await
    }

    /// Dataset section: picks the target column from the loaded columns.
    pub fn select_target_column(&self, column: impl Into<String>) -> Result<(), EditorError> {
        let node = self.require(PanelControl::TargetColumn)?;
        if self.store.snapshot().columns.is_empty() {
            return Err(EditorError::ControlUnavailable {
                control: PanelControl::TargetColumn,
                selected: Some(node.kind),
            });
        }
        self.write(ConfigUpdate::TargetColumn(column.into()))
    }

    /// Split section: moves the slider to `value`, snapped to the step.
    pub fn set_split_ratio(&self, value: f64) -> Result<SplitRatio, EditorError> {
        self.require(PanelControl::SplitRatio)?;
        let ratio = SplitRatio::from_slider(value).map_or(value, SplitRatio::as_f64);
        self.write(ConfigUpdate::SplitRatio(ratio))?;
        Ok(self.store.snapshot().split_ratio)
    }

    /// Preprocess section: selects the scaling method.
    pub fn select_preprocessing(&self, method: PreprocessingMethod) -> Result<(), EditorError> {
        self.require(PanelControl::Preprocessing)?;
        self.write(ConfigUpdate::Preprocessing(method))
    }

    /// Model section: selects the model type.
    pub fn select_model_type(&self, model: ModelType) -> Result<(), EditorError> {
        self.require(PanelControl::ModelType)?;
        self.write(ConfigUpdate::ModelType(model))
    }

    /// Model section: the Run control.
    pub async fn run(&self) -> Result<RunResult, EditorError> {
        self.require(PanelControl::Run)?;
        Ok(self.orchestrator.run().await?)
    }
}
