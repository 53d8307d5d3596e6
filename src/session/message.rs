//! Chat messages and their authors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the person at the keyboard.
    User,
    /// Produced by the reply source.
    Bot,
}

impl Sender {
    /// Label used when a surface renders the message as plain text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Bot => "Bot",
        }
    }
}

/// A single entry of the message log.
///
/// Messages are immutable once created; the log only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    text: String,
    sender: Sender,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message authored by `sender`.
    #[must_use]
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
