pub mod client;
pub mod conversation;
pub mod error;
pub mod retry;
pub mod types;

use std::future::Future;

use anyhow::{Context, Result};

pub use client::{
    ChatClient, ClientConfig, ANALYST_PROMPT, API_KEY_ENV, ASSISTANT_PROMPT, DEFAULT_ENDPOINT,
    DEFAULT_MODEL, PRODUCTIVITY_PROMPT,
};
pub use conversation::Conversation;
pub use error::ChatError;
pub use retry::RetryPolicy;
pub use types::{ChatOutcome, Role};

/// Drive a chat future to completion on an internal Tokio runtime.
pub fn run_blocking<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    Ok(runtime.block_on(future))
}
