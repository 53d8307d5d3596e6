//! Reply sources.
//!
//! The session controller asks a [`ReplySource`] for the bot's answer and
//! never cares how it is produced. Two strategies ship:
//!
//! - [`HttpReplySource`]: POSTs `{"message": ...}` to a chat endpoint and
//!   reads `{"reply": ...}` back
//! - [`SimulatedReplySource`]: waits a fixed delay and answers from a small
//!   keyword table

pub mod http;
pub mod simulated;

pub use http::HttpReplySource;
pub use simulated::{SimulatedReplySource, keyword_reply};

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a reply could not be obtained.
#[derive(Error, Debug)]
pub enum ReplyError {
    /// The request never completed (connection refused, reset, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint responded with {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("malformed reply: {0}")]
    Decode(#[from] serde_json::Error),

    /// No reply arrived within the request timeout.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The source could not produce a reply for another reason.
    #[error("reply source unavailable: {0}")]
    Unavailable(String),
}

/// Capability to turn one user message into one bot reply.
///
/// `Ok(None)` means the source answered without reply text; callers
/// substitute their fallback text.
#[async_trait]
pub trait ReplySource: Send + Sync + Debug {
    async fn obtain_reply(&self, message: &str) -> Result<Option<String>, ReplyError>;
}

/// Request body of the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
}

/// Response body of the chat endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReply {
    /// The bot's answer. Absent when the server had nothing to say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}
