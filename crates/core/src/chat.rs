//! Chat value objects: questions, answers, prompt headers and history messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder substituted with the requested number of suggestions.
pub const QUANTITY_PLACEHOLDER: &str = "***quantity***";

/// A user question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question(pub String);

impl Question {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A generated answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer(pub String);

impl Answer {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The fixed instruction block placed at the top of every prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header(pub String);

impl Header {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Replace every `***quantity***` placeholder with `quantity`.
    pub fn with_quantity(&self, quantity: usize) -> Header {
        Header(self.0.replace(QUANTITY_PLACEHOLDER, &quantity.to_string()))
    }
}

/// A question together with the answer it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswerPair {
    pub question: Question,
    pub answer: Answer,
}

/// Who wrote a history message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Chatbot,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "User"),
            Sender::Chatbot => write!(f, "Chatbot"),
        }
    }
}

/// A single message in the persisted chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
}

impl Message {
    pub fn new(content: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            timestamp: Utc::now(),
            sender,
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User)
    }

    /// Create a new chatbot message.
    pub fn chatbot(content: impl Into<String>) -> Self {
        Self::new(content, Sender::Chatbot)
    }
}
