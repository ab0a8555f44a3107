use thiserror::Error;

#[derive(Error, Debug)]
pub enum GpError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Load error: {0}")]
    Load(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GpError>;
