use crate::AdminLevel;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse {level} boundary document: {source}")]
    Parse {
        level: AdminLevel,
        #[source]
        source: serde_json::Error,
    },
    #[cfg(feature = "download_data")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
    #[error("Boundary document for {0} contains no features")]
    EmptyCollection(AdminLevel),
    #[error("No boundary source available for {0}")]
    SourceNotFound(AdminLevel),
    #[error("Unknown administrative level: {0:?}")]
    UnknownLevel(String),
}
