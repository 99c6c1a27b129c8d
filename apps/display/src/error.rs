use thiserror::Error;

pub type Result<T> = std::result::Result<T, DisplayError>;

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode result: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected status {0} from server")]
    UnexpectedStatus(u16),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}
