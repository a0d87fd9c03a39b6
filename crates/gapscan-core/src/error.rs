use thiserror::Error;

#[derive(Debug, Error)]
pub enum GapscanError {
    #[error("specs directory not found: {0}")]
    SpecsDirNotFound(String),

    #[error("failed to parse spec file '{path}': {reason}")]
    SpecParsing { path: String, reason: String },

    #[error("gap detection failed during {operation}: {message}")]
    GapDetection { operation: String, message: String },

    #[error("export to {format} failed: {reason}")]
    Export { format: String, reason: String },

    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    #[error("invalid gap status: {0}")]
    InvalidStatus(String),

    #[error("invalid phasing strategy: {0}")]
    InvalidStrategy(String),

    #[error("invalid effort estimate: optimistic {optimistic} > pessimistic {pessimistic}")]
    InvalidEffortRange { optimistic: f64, pessimistic: f64 },

    #[error("file too large: {path} ({size} bytes, limit {limit})")]
    FileTooLarge {
        path: String,
        size: u64,
        limit: u64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GapscanError>;
