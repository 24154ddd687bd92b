use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Pipeline error taxonomy
// ---------------------------------------------------------------------------

/// Errors raised by the feature cache, assembler and training runner.
///
/// Every failure propagates immediately; nothing in the pipeline retries.
#[derive(Debug, Error)]
pub enum Error {
    /// A cache read for a feature whose files were never saved.
    #[error("no cached record for feature '{name}' (missing {})", .path.display())]
    MissingRecord { name: String, path: PathBuf },

    /// Two assembled features produce the same output column.
    #[error("column '{column}' from feature '{feature}' is already present in the assembled table")]
    SchemaConflict { column: String, feature: String },

    /// `predict` was called before the scaler and model were fit.
    #[error("model is not fitted; run cross-validation first")]
    NotFitted,

    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    #[error("feature '{0}' is already registered")]
    DuplicateFeature(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Train and test parts of one feature disagree on their columns.
    #[error("feature '{name}': train columns {train:?} differ from test columns {test:?}")]
    ColumnMismatch {
        name: String,
        train: Vec<String>,
        test: Vec<String>,
    },

    #[error("feature '{feature}' has {actual} rows, expected {expected}")]
    RowCountMismatch {
        feature: String,
        expected: usize,
        actual: usize,
    },

    #[error("no features selected for assembly")]
    EmptySelection,

    #[error("column '{column}': unexpected value '{value}'")]
    UnknownCategory { column: String, value: String },

    /// Quantile edges collapsed while duplicates are not allowed.
    #[error("column '{column}': bin edges must be unique, got {edges:?}")]
    BinEdges { column: String, edges: Vec<f64> },

    #[error("train row {row} has no 'Survived' label")]
    MissingLabel { row: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("logger already installed: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
