use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
