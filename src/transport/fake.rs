use crate::error::TransportError;
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// One call seen by a [`FakeTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub body: String,
}

impl RecordedCall {
    pub fn parse<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

/// In-memory transport that records every call and replies with a scripted
/// body, or fails when no body is scripted.
#[derive(Clone, Default)]
pub struct FakeTransport {
    reply: Option<String>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl FakeTransport {
    /// A transport whose every call fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies to every call with `body` serialized as JSON.
    pub fn with_response<T: Serialize>(mut self, body: &T) -> serde_json::Result<Self> {
        self.reply = Some(serde_json::to_string(body)?);
        Ok(self)
    }

    /// Sleeps this long before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn post(&self, endpoint: &str, body: String) -> Result<String, TransportError> {
        self.calls.lock().await.push(RecordedCall {
            endpoint: endpoint.to_string(),
            body,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(TransportError::Status { status: 500 }),
        }
    }

    fn transport_name(&self) -> &str {
        "Fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Response;

    #[tokio::test]
    async fn test_default_fails_and_records() {
        let transport = FakeTransport::new();
        let result = transport.post("abc", "{}".to_string()).await;

        assert!(matches!(result, Err(TransportError::Status { status: 500 })));
        assert_eq!(
            transport.calls().await,
            vec![RecordedCall {
                endpoint: "abc".to_string(),
                body: "{}".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_scripted_response() {
        let resp = Response {
            request_id: "r1".to_string(),
            ..Response::default()
        };
        let transport = FakeTransport::new().with_response(&resp).unwrap();
        let body = transport.post("abc", String::new()).await.unwrap();

        let parsed: Response = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, resp);
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let transport = FakeTransport::new();
        let clone = transport.clone();
        let _ = clone.post("abc", String::new()).await;
        assert_eq!(transport.call_count().await, 1);
    }
}
