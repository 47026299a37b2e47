pub mod fake;
pub mod http;

pub use fake::{FakeTransport, RecordedCall};
pub use http::HttpTransport;

use crate::error::TransportError;

/// Remote call boundary used by the delivery client.
///
/// Timeouts, unsuccessful statuses and connection errors all come back as a
/// `TransportError`; the client does not distinguish between them.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// POSTs a JSON body and returns the response body of a 2xx reply.
    async fn post(&self, endpoint: &str, body: String) -> Result<String, TransportError>;

    /// Name of this transport (for logging)
    fn transport_name(&self) -> &str;
}
