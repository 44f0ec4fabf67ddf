//! Error types for graph construction and dataset merging.

use thiserror::Error;

use crate::annotation::io::ParseError;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// No usable input or contradictory options.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("dataset '{0}' is already present in the graph")]
    DuplicateDataset(String),

    #[error("dataset name '{0}' collides with a reserved table column")]
    ReservedName(String),

    #[error("dataset '{0}' is not present in the graph")]
    DatasetNotFound(String),

    #[error("dataset '{0}' has no abundance information")]
    MissingAbundance(String),

    /// Operation needs the `annotation` dataset but none was added.
    #[error("no annotation dataset has been added: {0}")]
    MissingAnnotation(String),

    #[error("gene '{0}' not found in the graph")]
    GeneNotFound(String),

    /// A path (or edge) references a vertex or edge absent from the tables.
    #[error("invalid path for transcript '{tid}': {reason}")]
    InvalidPath { tid: String, reason: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("abundance file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    pub(crate) fn invalid_path(tid: &str, reason: impl Into<String>) -> Self {
        GraphError::InvalidPath {
            tid: tid.to_string(),
            reason: reason.into(),
        }
    }
}
