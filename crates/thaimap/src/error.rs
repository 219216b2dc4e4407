use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThaiMapError {
    #[error("Data processing error: {0}")]
    DataProcessing(#[from] thaimap_data::DataError),
    #[error("Style error: {0}")]
    StyleError(#[from] crate::style::StyleError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),
}

pub type Result<T> = std::result::Result<T, ThaiMapError>;
