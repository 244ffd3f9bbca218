use reqwest::StatusCode;
use thiserror::Error;

pub type ForumResult<T> = Result<T, ForumError>;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("invalid base URL `{0}`")]
    InvalidBaseUrl(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("server rejected the request: {0}")]
    Rejected(String),
    #[error("response from {0} carried no data")]
    MissingData(String),
    #[error("comment content may not be empty")]
    EmptyComment,
    #[error("post {0} is locked")]
    Locked(String),
}

impl ForumError {
    /// Short text suitable for a user-facing notice.
    pub fn summary(&self) -> String {
        match self {
            ForumError::Status { status, .. } if status.as_u16() == 401 => {
                "You need to sign in again".to_string()
            }
            ForumError::Rejected(message) if !message.trim().is_empty() => message.clone(),
            ForumError::EmptyComment | ForumError::Locked(_) => self.to_string(),
            _ => "Something went wrong, please try again".to_string(),
        }
    }
}
