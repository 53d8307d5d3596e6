//! Simulated reply source with canned keyword answers.

use std::time::Duration;

use async_trait::async_trait;

use super::{ReplyError, ReplySource};

/// Delay before a simulated reply arrives.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Pick a canned answer for a message. Matching is case-insensitive and
/// first match wins.
#[must_use]
pub fn keyword_reply(message: &str) -> &'static str {
    let msg = message.to_lowercase();
    if msg.contains("hello") {
        "testt"
    } else if msg.contains("how are you") {
        "I'm just code, but I'm doing fine!"
    } else if msg.contains("bye") {
        "testt"
    } else {
        "testt testt"
    }
}

/// Reply source that answers locally after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedReplySource {
    delay: Duration,
}

impl Default for SimulatedReplySource {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl SimulatedReplySource {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A source that answers without waiting.
    #[must_use]
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl ReplySource for SimulatedReplySource {
    async fn obtain_reply(&self, message: &str) -> Result<Option<String>, ReplyError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Some(keyword_reply(message).to_string()))
    }
}
