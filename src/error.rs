//! Error types for the review/commit pipeline boundaries.

use thiserror::Error;

/// Failure to read a file's previous content from version control.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("'{path}' not found at revision '{revision}'")]
    NotFound { path: String, revision: String },
}

/// Failure to get a response out of the model backend.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Model transport error: {0}")]
    Transport(String),
}

/// Errors surfaced by the review and commit pipelines.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No changes supplied; nothing to send to the model")]
    EmptyChangeSet,

    #[error(transparent)]
    Model(#[from] ModelError),
}
