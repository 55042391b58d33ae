use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("no API key configured for the completion service")]
    MissingApiKey,

    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey,

    #[error("an advice request is already running for {username}")]
    Busy { username: String },

    #[error("completion request timed out")]
    Timeout,

    #[error("completion request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion response had no message content")]
    EmptyResponse,
}

impl From<reqwest::Error> for AdvisorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AdvisorError::Timeout
        } else {
            AdvisorError::Transport(e)
        }
    }
}
