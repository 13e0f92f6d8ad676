//! Port to the remote training service.
//!
//! The domain defines *what* it needs from the service; the `ml-service`
//! crate supplies an HTTP implementation and tests supply scripted fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    ModelType, PipelineConfig, PreprocessingMethod, RunResult, ServiceError, SplitRatio,
};

/// A dataset file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFile {
    /// File name as reported by the picker (sent as the multipart file name).
    pub file_name: String,
    /// Raw file contents.
    pub content: Vec<u8>,
}

impl DatasetFile {
    /// Creates a [`DatasetFile`].
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Body of a successful upload response.
///
/// `columns` is optional on the wire; callers treat its absence as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Column names parsed from the file, in file order.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

/// Parameters submitted to the run endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Dependent variable.
    pub target_column: String,
    /// Training fraction.
    pub split_ratio: SplitRatio,
    /// Feature scaling method.
    pub preprocessing: PreprocessingMethod,
    /// Classifier.
    pub model_type: ModelType,
}

impl RunRequest {
    /// Builds a request from a config snapshot, or `None` when no target
    /// column is set.
    pub fn from_config(config: &PipelineConfig) -> Option<Self> {
        Some(Self {
            target_column: config.target_column()?.to_string(),
            split_ratio: config.split_ratio,
            preprocessing: config.preprocessing,
            model_type: config.model_type,
        })
    }

    /// Form fields in the order the run endpoint documents them.
    pub fn form_fields(&self) -> [(&'static str, String); 4] {
        [
            ("target_column", self.target_column.clone()),
            ("split_ratio", self.split_ratio.to_string()),
            ("preprocessing", self.preprocessing.as_wire_str().to_string()),
            ("model_type", self.model_type.as_wire_str().to_string()),
        ]
    }
}

/// The remote service that parses datasets and trains models.
#[async_trait]
pub trait TrainingService: Send + Sync {
    /// Uploads a dataset file and returns the parsed column list.
    async fn upload_dataset(&self, file: DatasetFile) -> Result<UploadResponse, ServiceError>;

    /// Trains a model with the given parameters.
    async fn run_pipeline(&self, request: &RunRequest) -> Result<RunResult, ServiceError>;
}
