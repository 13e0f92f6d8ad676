//! Dataset upload flow behind the Dataset section of the configuration panel.
//!
//! A successful upload replaces the column list and sets the target column to
//! the last column in one store write, so observers never see the new columns
//! without a matching target. The target is overwritten on every successful
//! upload, including re-uploads after the user picked a different target. An
//! empty column list is accepted and leaves no target; only a response without
//! a column list is a failure.
//!
//! If the upload future is dropped before the service answers, the status
//! returns to `Idle` and the config is untouched.

use std::sync::Arc;

use parking_lot::Mutex;
use pipeline::{
    ConfigUpdate, DatasetFile, PipelineConfigStore, SessionId, SubscriptionId, Subscribers,
    TrainingService, UploadResponse, UploadStatus,
};
use tracing::{error, info, instrument, warn};

use crate::gate::{BusyFlag, OnCancel};
use crate::EditorError;

/// Reason recorded when the upload endpoint answers without columns.
pub const NO_COLUMNS_REASON: &str = "backend returned no columns";

/// Uploads datasets and applies the returned columns to the config store.
pub struct DatasetUploader {
    session: SessionId,
    store: Arc<PipelineConfigStore>,
    service: Arc<dyn TrainingService>,
    gate: Option<BusyFlag>,
    status: Mutex<UploadStatus>,
    subscribers: Subscribers<UploadStatus>,
}

impl DatasetUploader {
    /// Creates an uploader. `gate` is shared with the run orchestrator under
    /// the serialized policy and absent otherwise.
    pub fn new(
        session: SessionId,
        store: Arc<PipelineConfigStore>,
        service: Arc<dyn TrainingService>,
        gate: Option<BusyFlag>,
    ) -> Self {
        Self {
            session,
            store,
            service,
            gate,
            status: Mutex::new(UploadStatus::Idle),
            subscribers: Subscribers::new(),
        }
    }

    /// Current upload status.
    pub fn status(&self) -> UploadStatus {
        self.status.lock().clone()
    }

    /// Registers an observer called on every status change.
    pub fn subscribe(
        &self,
        callback: impl Fn(&UploadStatus) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    fn set_status(&self, status: UploadStatus) {
        *self.status.lock() = status.clone();
        self.subscribers.notify(&status);
    }

    /// Uploads `file` and, on success, returns the applied column list.
    ///
    /// On any failure the status becomes [`UploadStatus::Failed`] and the
    /// config store is left untouched.
    #[instrument(skip(self, file), fields(session = %self.session, file = %file.file_name, bytes = file.content.len()))]
    pub async fn upload(&self, file: DatasetFile) -> Result<Vec<String>, EditorError> {
        let _guard = match &self.gate {
            Some(gate) => match gate.try_acquire() {
                Some(guard) => Some(guard),
                None => {
                    warn!("Upload rejected: another request is in flight");
                    return Err(EditorError::RequestInFlight);
                }
            },
            None => None,
        };

        self.set_status(UploadStatus::Uploading);

        let pending = OnCancel::new(|| {
            warn!("Upload dropped before the service answered");
            self.set_status(UploadStatus::Idle);
        });
        let response = self.service.upload_dataset(file).await;
        pending.disarm();

        let columns = match response {
            Ok(UploadResponse {
                columns: Some(columns),
            }) => columns,
            Ok(UploadResponse { columns: None }) => {
                warn!("Upload response carried no columns");
                self.set_status(UploadStatus::Failed {
                    reason: NO_COLUMNS_REASON.to_string(),
                });
                return Err(EditorError::MissingColumns);
            }
            Err(e) => {
                error!(error = %e, "Dataset upload failed");
                self.set_status(UploadStatus::Failed {
                    reason: format!("upload failed: {e}"),
                });
                return Err(e.into());
            }
        };

        self.store
            .apply_update(ConfigUpdate::Dataset(columns.clone()))?;

        info!(columns = columns.len(), "Dataset uploaded");
        self.set_status(UploadStatus::Success);
        Ok(columns)
    }
}

impl std::fmt::Debug for DatasetUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetUploader")
            .field("session", &self.session)
            .field("status", &*self.status.lock())
            .field("gated", &self.gate.is_some())
            .finish()
    }
}
