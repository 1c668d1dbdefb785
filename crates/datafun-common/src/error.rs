use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatafunError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Could not parse file: {0}")]
    FileParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<csv::Error> for DatafunError {
    fn from(err: csv::Error) -> Self {
        DatafunError::FileParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DatafunError>;
