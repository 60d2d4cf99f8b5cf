use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("empty query")]
    EmptyQuery,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {0} timed out")]
    Timeout(String),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, LookupError>;
