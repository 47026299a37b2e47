use crate::error::TransportError;
use crate::transport::Transport;
use reqwest::Client;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-api-key";

/// Network-backed transport for one remote service.
///
/// Each client owns its own transports; nothing is shared between client
/// instances.
pub struct HttpTransport {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post(&self, endpoint: &str, body: String) -> Result<String, TransportError> {
        let response = self
            .client
            .post(endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .body(body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    fn transport_name(&self) -> &str {
        "Http"
    }
}
