use thiserror::Error;

#[derive(Error, Debug)]
pub enum LectureError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Service(String),

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

impl LectureError {
    /// Rejected before any outbound call was made
    pub fn is_validation(&self) -> bool {
        matches!(self, LectureError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, LectureError>;
