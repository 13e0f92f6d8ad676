//! The pipeline config store: the single owned record of pipeline parameters.
//!
//! Every writer goes through [`PipelineConfigStore::apply_update`], which merges
//! exactly one field, enforces the store's invariants, and then notifies
//! subscribers. Readers receive cloned snapshots; nothing outside the store
//! holds a mutable copy.
//!
//! ## Invariants
//!
//! - `split_ratio` is always within `[0.1, 0.9]`.
//! - Once `columns` is non-empty, `target_column` is an element of `columns`.
//!   Replacing the column list keeps a target that is still present and
//!   otherwise defaults it to the last column, in the same write.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::observers::{SubscriptionId, Subscribers};
use crate::{ConfigError, ModelType, PreprocessingMethod, SplitRatio};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Snapshot of the pipeline parameters submitted by a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Column names of the uploaded dataset, in file order.
    pub columns: Vec<String>,
    /// Dependent variable; `None` until a dataset is uploaded.
    pub target_column: Option<String>,
    /// Fraction of rows used for training.
    pub split_ratio: SplitRatio,
    /// Feature scaling method.
    pub preprocessing: PreprocessingMethod,
    /// Classifier to train.
    pub model_type: ModelType,
}

impl PipelineConfig {
    /// Returns the target column if one is set and non-empty.
    pub fn target_column(&self) -> Option<&str> {
        self.target_column.as_deref().filter(|c| !c.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// Names a single field of [`PipelineConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigField {
    /// [`PipelineConfig::columns`]
    Columns,
    /// [`PipelineConfig::columns`] and [`PipelineConfig::target_column`] together.
    Dataset,
    /// [`PipelineConfig::target_column`]
    TargetColumn,
    /// [`PipelineConfig::split_ratio`]
    SplitRatio,
    /// [`PipelineConfig::preprocessing`]
    Preprocessing,
    /// [`PipelineConfig::model_type`]
    ModelType,
}

/// A single-field write dispatched to [`PipelineConfigStore::apply_update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ConfigUpdate {
    /// Replace the column list, keeping the target when it is still present.
    Columns(Vec<String>),
    /// A freshly uploaded dataset: replace the column list and set the target
    /// to the last column.
    Dataset(Vec<String>),
    /// Select the target column; must be one of the loaded columns.
    TargetColumn(String),
    /// Set the split ratio; must be within `[0.1, 0.9]`.
    SplitRatio(f64),
    /// Select the preprocessing method.
    Preprocessing(PreprocessingMethod),
    /// Select the model type.
    ModelType(ModelType),
}

impl ConfigUpdate {
    /// The field this update writes.
    pub fn field(&self) -> ConfigField {
        match self {
            ConfigUpdate::Columns(_) => ConfigField::Columns,
            ConfigUpdate::Dataset(_) => ConfigField::Dataset,
            ConfigUpdate::TargetColumn(_) => ConfigField::TargetColumn,
            ConfigUpdate::SplitRatio(_) => ConfigField::SplitRatio,
            ConfigUpdate::Preprocessing(_) => ConfigField::Preprocessing,
            ConfigUpdate::ModelType(_) => ConfigField::ModelType,
        }
    }
}

/// Published after every accepted update.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEvent {
    /// The field that changed.
    pub field: ConfigField,
    /// The full record after the change.
    pub config: PipelineConfig,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Owner of the session's [`PipelineConfig`].
#[derive(Debug, Default)]
pub struct PipelineConfigStore {
    config: Mutex<PipelineConfig>,
    subscribers: Subscribers<ConfigEvent>,
}

impl PipelineConfigStore {
    /// Creates a store holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current configuration.
    pub fn snapshot(&self) -> PipelineConfig {
        self.config.lock().clone()
    }

    /// Merges one field into the configuration.
    ///
    /// A rejected update leaves the configuration untouched and notifies no one.
    pub fn apply_update(&self, update: ConfigUpdate) -> Result<(), ConfigError> {
        let field = update.field();
        let config = {
            let mut config = self.config.lock();
            match update {
                ConfigUpdate::Columns(columns) => {
                    let keep = config
                        .target_column
                        .as_ref()
                        .is_some_and(|target| columns.contains(target));
                    if !keep {
                        config.target_column = columns.last().cloned();
                    }
                    config.columns = columns;
                }
                ConfigUpdate::Dataset(columns) => {
                    config.target_column = columns.last().cloned();
                    config.columns = columns;
                }
                ConfigUpdate::TargetColumn(column) => {
                    if !config.columns.contains(&column) {
                        return Err(ConfigError::UnknownColumn { column });
                    }
                    config.target_column = Some(column);
                }
                ConfigUpdate::SplitRatio(value) => {
                    config.split_ratio = SplitRatio::new(value)
                        .ok_or(ConfigError::SplitRatioOutOfRange { value })?;
                }
                ConfigUpdate::Preprocessing(method) => config.preprocessing = method,
                ConfigUpdate::ModelType(model) => config.model_type = model,
            }
            config.clone()
        };

        debug!(?field, "Applied pipeline config update");
        self.subscribers.notify(&ConfigEvent { field, config });
        Ok(())
    }

    /// Registers an observer called after every accepted update.
    pub fn subscribe(
        &self,
        callback: impl Fn(&ConfigEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    /// Removes an observer.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfigStore::new().snapshot();
        assert!(config.columns.is_empty());
        assert_eq!(config.target_column(), None);
        assert_eq!(config.split_ratio.as_f64(), 0.8);
        assert_eq!(config.preprocessing, PreprocessingMethod::StandardScaler);
        assert_eq!(config.model_type, ModelType::LogisticRegression);
    }

    #[test]
    fn test_target_must_be_a_loaded_column() {
        let store = PipelineConfigStore::new();
        assert_eq!(
            store.apply_update(ConfigUpdate::TargetColumn("a".to_string())),
            Err(ConfigError::UnknownColumn {
                column: "a".to_string()
            })
        );

        store
            .apply_update(ConfigUpdate::Columns(columns(&["a", "b"])))
            .unwrap();
        store
            .apply_update(ConfigUpdate::TargetColumn("a".to_string()))
            .unwrap();
        assert_eq!(store.snapshot().target_column(), Some("a"));
        assert!(store
            .apply_update(ConfigUpdate::TargetColumn("z".to_string()))
            .is_err());
        assert_eq!(store.snapshot().target_column(), Some("a"));
    }

    #[test]
    fn test_replacing_columns_keeps_or_defaults_target() {
        let store = PipelineConfigStore::new();
        store
            .apply_update(ConfigUpdate::Columns(columns(&["a", "b"])))
            .unwrap();
        store
            .apply_update(ConfigUpdate::TargetColumn("b".to_string()))
            .unwrap();

        store
            .apply_update(ConfigUpdate::Columns(columns(&["b", "c"])))
            .unwrap();
        assert_eq!(store.snapshot().target_column(), Some("b"));

        store
            .apply_update(ConfigUpdate::Columns(columns(&["x", "y"])))
            .unwrap();
        assert_eq!(store.snapshot().target_column(), Some("y"));

        store.apply_update(ConfigUpdate::Columns(Vec::new())).unwrap();
        assert_eq!(store.snapshot().target_column(), None);
    }

    #[test]
    fn test_dataset_update_is_one_consistent_event() {
        let store = PipelineConfigStore::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.subscribe(move |e: &ConfigEvent| sink.lock().push(e.clone()));

        store
            .apply_update(ConfigUpdate::Dataset(columns(&["a", "b", "c"])))
            .unwrap();
        store
            .apply_update(ConfigUpdate::TargetColumn("a".to_string()))
            .unwrap();
        // Re-upload overwrites the chosen target even though it is still present.
        store
            .apply_update(ConfigUpdate::Dataset(columns(&["a", "z"])))
            .unwrap();
        store.apply_update(ConfigUpdate::Dataset(Vec::new())).unwrap();

        let events = events.lock();
        let seen: Vec<_> = events
            .iter()
            .map(|e| (e.field, e.config.columns.len(), e.config.target_column.clone()))
            .collect();
        assert_eq!(
            seen,
            vec![
                (ConfigField::Dataset, 3, Some("c".to_string())),
                (ConfigField::TargetColumn, 3, Some("a".to_string())),
                (ConfigField::Dataset, 2, Some("z".to_string())),
                (ConfigField::Dataset, 0, None),
            ]
        );
    }

    #[test]
    fn test_out_of_range_split_ratio_is_rejected() {
        let store = PipelineConfigStore::new();
        assert_eq!(
            store.apply_update(ConfigUpdate::SplitRatio(0.95)),
            Err(ConfigError::SplitRatioOutOfRange { value: 0.95 })
        );
        assert_eq!(store.snapshot().split_ratio.as_f64(), 0.8);
    }

    #[test]
    fn test_subscribers_see_each_accepted_update() {
        let store = PipelineConfigStore::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.subscribe(move |e: &ConfigEvent| sink.lock().push(e.field));

        store
            .apply_update(ConfigUpdate::ModelType(ModelType::DecisionTree))
            .unwrap();
        let _ = store.apply_update(ConfigUpdate::SplitRatio(2.0));
        store
            .apply_update(ConfigUpdate::Preprocessing(PreprocessingMethod::MinMaxScaler))
            .unwrap();

        assert_eq!(
            *events.lock(),
            vec![ConfigField::ModelType, ConfigField::Preprocessing]
        );
    }

    proptest! {
        #[test]
        fn prop_target_is_always_a_loaded_column(
            lists in proptest::collection::vec(proptest::collection::vec("[a-d]", 0..4), 1..12),
            dataset in proptest::collection::vec(any::<bool>(), 12),
        ) {
            let store = PipelineConfigStore::new();
            let events = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&events);
            store.subscribe(move |e: &ConfigEvent| sink.lock().push(e.config.clone()));

            for (list, as_dataset) in lists.into_iter().zip(dataset) {
                let update = if as_dataset {
                    ConfigUpdate::Dataset(list)
                } else {
                    ConfigUpdate::Columns(list)
                };
                store.apply_update(update).unwrap();
            }

            for config in events.lock().iter() {
                if !config.columns.is_empty() {
                    let target = config.target_column().unwrap_or_default().to_string();
                    prop_assert!(config.columns.contains(&target));
                }
            }
        }

        #[test]
        fn prop_split_ratio_stays_in_range(edits in proptest::collection::vec(-1.0f64..2.0, 0..64)) {
            let store = PipelineConfigStore::new();
            for value in edits {
                let _ = store.apply_update(ConfigUpdate::SplitRatio(value));
                let ratio = store.snapshot().split_ratio.as_f64();
                prop_assert!((SplitRatio::MIN..=SplitRatio::MAX).contains(&ratio));
            }
        }
    }
}
