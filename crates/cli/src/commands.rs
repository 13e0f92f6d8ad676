//! Subcommand implementations. Each drives an [`EditorSession`] the same way
//! an interactive user would: through the palette, the canvas and the panel.

use std::path::Path;

use anyhow::{bail, Context, Result};
use editor::EditorSession;
use pipeline::{
    palette_entry, DatasetFile, ModelType, Node, NodeKind, Position, PreprocessingMethod,
    RunResult, PALETTE,
};
use serde::Serialize;
use tracing::info;

/// Horizontal spacing of dropped nodes, in screen pixels.
const NODE_SPACING: f64 = 220.0;
const NODE_ROW: f64 = 150.0;

/// One palette entry as printed by `catalog`.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub kind: NodeKind,
    pub label: &'static str,
    pub has_input: bool,
    pub has_output: bool,
}

pub fn catalog() -> Vec<CatalogEntry> {
    PALETTE
        .iter()
        .map(|entry| CatalogEntry {
            kind: entry.kind,
            label: entry.label,
            has_input: entry.kind.has_input_handle(),
            has_output: entry.kind.has_output_handle(),
        })
        .collect()
}

/// Overrides applied through the panel before a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub target: Option<String>,
    pub split: Option<f64>,
    pub preprocessing: Option<PreprocessingMethod>,
    pub model: Option<ModelType>,
}

pub async fn read_dataset(path: &Path) -> Result<DatasetFile> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset.csv".to_string());
    Ok(DatasetFile::new(file_name, content))
}

/// Uploads `file` through a Dataset node and returns the parsed columns.
pub async fn upload(session: &EditorSession, file: DatasetFile) -> Result<Vec<String>> {
    let dataset = dataset_node(session)?;
    session.select_node(&dataset.id)?;
    let columns = session.panel().upload_file(file).await?;
    info!(count = columns.len(), "Dataset uploaded");
    Ok(columns)
}

/// Lays out the four-stage pipeline, configures each stage and runs it.
pub async fn run(
    session: &EditorSession,
    file: DatasetFile,
    options: RunOptions,
) -> Result<RunResult> {
    let dataset = dataset_node(session)?;
    let preprocess = drop_from_palette(session, NodeKind::Preprocess, 1)?;
    let split = drop_from_palette(session, NodeKind::Split, 2)?;
    let model = drop_from_palette(session, NodeKind::Model, 3)?;
    for (source, target) in [(&dataset, &preprocess), (&preprocess, &split), (&split, &model)] {
        session.connect(&source.id, &target.id)?;
    }

    let panel = session.panel();

    session.select_node(&dataset.id)?;
    panel.upload_file(file).await?;
    if let Some(target) = options.target {
        panel.select_target_column(target)?;
    }

    session.select_node(&split.id)?;
    if let Some(split_ratio) = options.split {
        panel.set_split_ratio(split_ratio)?;
    }

    session.select_node(&preprocess.id)?;
    if let Some(method) = options.preprocessing {
        panel.select_preprocessing(method)?;
    }

    session.select_node(&model.id)?;
    if let Some(model_type) = options.model {
        panel.select_model_type(model_type)?;
    }

    Ok(panel.run().await?)
}

/// The seed Dataset node, or a freshly dropped one when seeding is off.
fn dataset_node(session: &EditorSession) -> Result<Node> {
    match session
        .graph()
        .nodes()
        .into_iter()
        .find(|node| node.kind == NodeKind::Dataset)
    {
        Some(node) => Ok(node),
        None => drop_from_palette(session, NodeKind::Dataset, 0),
    }
}

fn drop_from_palette(session: &EditorSession, kind: NodeKind, column: u32) -> Result<Node> {
    session.begin_drag(palette_entry(kind).drag_payload());
    let position = Position::new(f64::from(column) * NODE_SPACING, NODE_ROW);
    match session.complete_drop(position) {
        Some(node) => Ok(node),
        None => bail!("Dropping a {kind} node produced nothing"),
    }
}
