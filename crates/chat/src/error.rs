use thiserror::Error;

/// Construction-time failures. Per-request failures are reported as [`ChatOutcome`](crate::ChatOutcome).
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Please set the OPENAI_API_KEY environment variable.")]
    MissingCredential,
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
}
