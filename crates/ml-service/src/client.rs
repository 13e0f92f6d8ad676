use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use pipeline::{DatasetFile, RunRequest, RunResult, ServiceError, TrainingService, UploadResponse};

/// Base URL of the hosted demo backend.
pub const DEFAULT_BASE_URL: &str = "https://ml-pipeline-demo.onrender.com";

/// Connection settings for [`HttpTrainingService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpServiceConfig {
    /// Service root; endpoint paths are appended to it.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

/// [`TrainingService`] backed by the remote HTTP API.
#[derive(Debug, Clone)]
pub struct HttpTrainingService {
    config: HttpServiceConfig,
    client: Client,
}

impl HttpTrainingService {
    /// Builds the underlying HTTP client.
    pub fn new(config: HttpServiceConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Transport {
                message: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self { config, client })
    }

    /// The settings this client was built with.
    pub fn config(&self) -> &HttpServiceConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ServiceError> {
        let url = self.endpoint(path);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(map_http_error)?;
        decode(response).await
    }
}

fn map_http_error(error: reqwest::Error) -> ServiceError {
    let message = if error.is_timeout() {
        format!("Request timeout: {error}")
    } else if error.is_connect() {
        format!("Connection error: {error}")
    } else {
        format!("HTTP error: {error}")
    };
    ServiceError::Transport { message }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response.text().await.map_err(map_http_error)?;
    if !status.is_success() {
        warn!(status = status.as_u16(), "Training service rejected the request");
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| ServiceError::MalformedResponse {
        message: e.to_string(),
    })
}

#[async_trait]
impl TrainingService for HttpTrainingService {
    #[instrument(skip(self, file), fields(file_name = %file.file_name, bytes = file.content.len()))]
    async fn upload_dataset(&self, file: DatasetFile) -> Result<UploadResponse, ServiceError> {
        let part = Part::bytes(file.content).file_name(file.file_name);
        let form = Form::new().part("file", part);

        let response: UploadResponse = self.post_form("upload", form).await?;
        debug!(columns = ?response.columns, "Upload parsed");
        Ok(response)
    }

    #[instrument(skip(self, request), fields(target_column = %request.target_column, model_type = %request.model_type))]
    async fn run_pipeline(&self, request: &RunRequest) -> Result<RunResult, ServiceError> {
        let form = request
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        let result: RunResult = self.post_form("run", form).await?;
        debug!(accuracy = result.accuracy, status = %result.status, "Run finished");
        Ok(result)
    }
}
