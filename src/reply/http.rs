//! HTTP reply source.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::{ChatReply, ChatRequest, ReplyError, ReplySource};

/// Default chat endpoint of a locally running server.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";

/// Reply source backed by a `POST` JSON endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use chat_widget::reply::{HttpReplySource, ReplySource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = HttpReplySource::new("http://127.0.0.1:5000/chat")?;
/// let reply = source.obtain_reply("hello").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpReplySource {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpReplySource {
    /// Create a source for the given endpoint URL.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    /// Create a source with a custom reqwest client.
    pub fn with_client(
        endpoint: impl AsRef<str>,
        http: reqwest::Client,
    ) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(endpoint.as_ref())?;
        Ok(Self { endpoint, http })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ReplySource for HttpReplySource {
    async fn obtain_reply(&self, message: &str) -> Result<Option<String>, ReplyError> {
        let request = ChatRequest {
            message: message.to_string(),
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!(name: "reply.http.response", status = status.as_u16(), "Chat endpoint responded");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReplyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let reply: ChatReply = serde_json::from_slice(&bytes)?;
        Ok(reply.reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        assert!(HttpReplySource::new("not a url").is_err());
    }

    #[test]
    fn test_keeps_endpoint_path() {
        let source = HttpReplySource::new(DEFAULT_ENDPOINT).unwrap();
        assert_eq!(source.endpoint().path(), "/chat");
    }

    #[test]
    fn test_reply_body_without_reply_field() {
        let reply: ChatReply = serde_json::from_str("{}").unwrap();
        assert!(reply.reply.is_none());
    }
}
