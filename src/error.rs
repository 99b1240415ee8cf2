use std::path::PathBuf;

/// Errors raised while reading or validating the run configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Parse { key: String, value: String },

    #[error("config validation error: {0}")]
    Validation(String),
}

/// The generator could not produce a maze for the configured dimensions.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(
        "could not generate a {width}x{height} maze with {keys} key(s) after {attempts} attempts"
    )]
    Exhausted {
        attempts: usize,
        width: i32,
        height: i32,
        keys: usize,
    },

    #[error("a {width}x{height} maze is too small, both sides must be at least {min}")]
    TooSmall { width: i32, height: i32, min: i32 },
}

/// Errors that can occur while saving or restoring the action-value table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("action-value table not found: {0}")]
    NotFound(PathBuf),

    #[error("action-value table has {found} values, expected {expected}")]
    Shape { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Table(#[from] TableError),
}
