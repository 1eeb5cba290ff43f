use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    /// An authenticated call was attempted without a credential. No request was sent.
    #[error("not signed in")]
    Unauthenticated,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway gave up waiting for the backend (HTTP 504).
    #[error("{0}")]
    TimedOut(String),

    #[error("gateway returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, SdkError>;
