use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpisubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Not a valid directory: {0}")]
    InvalidInputDirectory(String),

    #[error("Subtitle parse error at line {line}: {message}")]
    SubtitleParse { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, EpisubError>;
