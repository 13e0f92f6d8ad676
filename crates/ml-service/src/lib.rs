//! mlcanvas training service adapter.
//!
//! Implements the [`pipeline::TrainingService`] trait over HTTP. The remote
//! service exposes two multipart endpoints:
//!
//! | Endpoint      | Form fields                                                   | Response                          |
//! |---------------|---------------------------------------------------------------|-----------------------------------|
//! | `POST /upload`| `file` (the dataset)                                          | `{ "columns": [..] }`             |
//! | `POST /run`   | `target_column`, `split_ratio`, `preprocessing`, `model_type` | `{ status, accuracy, confusion_matrix }` |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, form encoding and response parsing
//! live here. The [`pipeline`] and `editor` crates see only
//! [`pipeline::TrainingService`].

mod client;

pub use client::{HttpServiceConfig, HttpTrainingService, DEFAULT_BASE_URL};
