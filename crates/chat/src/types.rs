//! Wire shapes for the chat-completions endpoint and the caller-facing outcome.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const QUOTA_EXHAUSTED_CODE: &str = "insufficient_quota";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body: the model plus exactly one system and one user message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: [Message; 2],
}

impl ChatRequest {
    pub fn new(model: &str, system_prompt: &str, user_prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: [Message::system(system_prompt), Message::user(user_prompt)],
        }
    }
}

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Content of the first completion, if the body has the expected shape.
pub fn first_completion(raw: &str) -> Option<String> {
    let completion: Completion = serde_json::from_str(raw).ok()?;
    completion.choices.into_iter().next()?.message.content
}

/// Structured `{error: {code, message}}` envelope. Absent when the body does not parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiError {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    pub fn parse(raw: &str) -> Option<Self> {
        let envelope: ErrorEnvelope = serde_json::from_str(raw).ok()?;
        let code = match envelope.error.code {
            Some(Value::String(code)) => Some(code),
            Some(Value::Number(code)) => Some(code.to_string()),
            _ => None,
        };
        Some(Self {
            code,
            message: envelope.error.message,
        })
    }

    pub fn is_quota_exhausted(&self) -> bool {
        self.code.as_deref() == Some(QUOTA_EXHAUSTED_CODE)
    }
}

/// Terminal result of a chat call. Failures are values, never panics or errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Reply(String),
    QuotaExhausted { message: String },
    Failed { code: String, message: String },
}

impl ChatOutcome {
    pub fn reply(&self) -> Option<&str> {
        match self {
            ChatOutcome::Reply(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, ChatOutcome::Reply(_))
    }

    /// Text suitable for display whichever way the call ended.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChatOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatOutcome::Reply(text) => write!(f, "{}", text),
            ChatOutcome::QuotaExhausted { message } => write!(f, "[Quota Error]: {}", message),
            ChatOutcome::Failed { code, message } => write!(f, "[Error {}]: {}", code, message),
        }
    }
}
