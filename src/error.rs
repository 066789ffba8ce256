//! Error taxonomy shared by the genetic core and the library adapter.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LabError>;

#[derive(Debug, Error)]
pub enum LabError {
    #[error("cannot mutate empty genome")]
    EmptyGenome,

    #[error("prompt not found: {0}")]
    PromptNotFound(String),

    #[error("invalid category: '{0}' (expected one of simple, work, agentic, stocks, fun)")]
    InvalidCategory(String),

    #[error("invalid tier: '{0}' (expected one of free, premium, enterprise)")]
    InvalidTier(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
