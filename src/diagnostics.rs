/// Sink for the client's diagnostic messages. Never influences control flow.
pub trait Diagnostics: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn info(&self, message: &str) {
        tracing::info!(target: "delivery_client", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "delivery_client", "{}", message);
    }
}
