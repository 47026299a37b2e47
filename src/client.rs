//! Delivery orchestration.
//!
//! `DeliveryClient::deliver` decides per call whether to ask the remote
//! delivery service or serve locally, and makes sure metrics and shadow
//! traffic never add latency to the caller:
//!
//! 1. Validate (optional, advisory) and fill necessary request fields
//! 2. Control arm or `only_log_to_metrics` => serve locally without calling
//!    the remote service; otherwise call it and serve locally on any failure
//! 3. Locally served or experiment present => dispatch a metrics log
//! 4. Remote never attempted => maybe dispatch a shadow copy of the request
//!
//! Dispatched calls are tracked by a [`TaskRegistry`]; `shutdown` waits for
//! them, and so does dropping the client on a multi-thread runtime.

use crate::config::ClientConfig;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::{ConfigError, Result, TransportError};
use crate::fallback;
use crate::metrics;
use crate::options::{DeliveryClientOptions, DeliveryRequestOptions};
use crate::request_processor;
use crate::sampling;
use crate::task_registry::{TaskOutcome, TaskRegistry};
use crate::transport::{HttpTransport, Transport};
use crate::types::{LogRequest, Request, Response};
use std::sync::Arc;

pub struct DeliveryClient {
    delivery_transport: Arc<dyn Transport>,
    delivery_endpoint: String,
    metrics_transport: Arc<dyn Transport>,
    metrics_endpoint: String,
    options: DeliveryClientOptions,
    diagnostics: Arc<dyn Diagnostics>,
    pending: TaskRegistry,
}

impl DeliveryClient {
    pub fn new(
        delivery_transport: Arc<dyn Transport>,
        delivery_endpoint: impl Into<String>,
        metrics_transport: Arc<dyn Transport>,
        metrics_endpoint: impl Into<String>,
        options: DeliveryClientOptions,
    ) -> Self {
        let client = Self {
            delivery_transport,
            delivery_endpoint: delivery_endpoint.into(),
            metrics_transport,
            metrics_endpoint: metrics_endpoint.into(),
            options,
            diagnostics: Arc::new(TracingDiagnostics),
            pending: TaskRegistry::new(),
        };
        client.log_construction();
        client
    }

    /// Builds a client that talks HTTP to the configured endpoints.
    pub fn from_config(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        let delivery = HttpTransport::new(config.delivery.api_key, config.delivery.timeout)?;
        let metrics = HttpTransport::new(config.metrics.api_key, config.metrics.timeout)?;

        Ok(Self::new(
            Arc::new(delivery),
            config.delivery.endpoint,
            Arc::new(metrics),
            config.metrics.endpoint,
            config.options,
        ))
    }

    /// Replaces the diagnostics sink (defaults to `tracing`).
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn options(&self) -> &DeliveryClientOptions {
        &self.options
    }

    /// Number of metrics/shadow calls still in flight.
    pub fn pending_tasks(&self) -> usize {
        self.pending.len()
    }

    fn log_construction(&self) {
        self.diagnostics.info("Constructed delivery client:");
        self.diagnostics.info(&format!(
            "- Delivery endpoint = {} ({})",
            self.delivery_endpoint,
            self.delivery_transport.transport_name()
        ));
        self.diagnostics.info(&format!(
            "- Metrics endpoint = {} ({})",
            self.metrics_endpoint,
            self.metrics_transport.transport_name()
        ));
    }

    /// Serves one ranking request.
    ///
    /// Only fails for caller errors (see [`crate::DeliveryError`]), and does
    /// so before any network activity. Remote failures fall back to local
    /// delivery and are only reported through diagnostics.
    pub async fn deliver(
        &self,
        mut req: Request,
        options: Option<DeliveryRequestOptions>,
    ) -> Result<Response> {
        let options = options.unwrap_or_default();

        if self.options.validate {
            for problem in request_processor::validate(&req) {
                self.diagnostics
                    .error(&format!("Delivery request validation problem: {}", problem));
            }
        }

        request_processor::fill_necessary_fields(&mut req);
        fallback::check_paging(&req, &options)?;

        let only_sdk_delivery = options.only_log_to_metrics
            || request_processor::is_in_control(options.experiment.as_ref());

        // Taken before the serving path assigns a request id.
        let shadow_request = if only_sdk_delivery && self.should_send_shadow_traffic() {
            Some(req.clone())
        } else {
            None
        };

        let (resp, did_sdk_delivery) = if only_sdk_delivery {
            (fallback::deliver(&mut req, &options)?, true)
        } else {
            match self.call_delivery(&req).await {
                Ok(resp) => {
                    req.request_id = resp.request_id.clone();
                    (resp, false)
                }
                Err(err) => {
                    self.diagnostics.error(&format!(
                        "Delivery request failed, falling back to SDK delivery: {}",
                        err
                    ));
                    (fallback::deliver(&mut req, &options)?, true)
                }
            }
        };

        if did_sdk_delivery || options.experiment.is_some() {
            let log_req = metrics::make_log_request(
                &req,
                &resp,
                did_sdk_delivery,
                options.experiment.as_ref(),
            );
            self.call_metrics(&log_req);
        }

        if let Some(mut shadow) = shadow_request {
            request_processor::convert_to_shadow_request(&mut shadow);
            self.call_shadow(&shadow);
        }

        Ok(resp)
    }

    /// Waits for every dispatched metrics and shadow call to finish.
    ///
    /// Stop calling `deliver` before shutting down; calls dispatched during
    /// shutdown race with it.
    pub async fn shutdown(&self) {
        self.diagnostics.info(&format!(
            "Waiting for {} pending tasks to complete...",
            self.pending.len()
        ));
        self.pending.drain().await;
        self.diagnostics.info("All pending tasks completed");
    }

    fn should_send_shadow_traffic(&self) -> bool {
        let rate = self.options.shadow_traffic_rate();
        rate > 0.0 && sampling::next_f32() < rate
    }

    async fn call_delivery(&self, req: &Request) -> std::result::Result<Response, TransportError> {
        let body = serde_json::to_string(req)?;
        let payload = self
            .delivery_transport
            .post(&self.delivery_endpoint, body)
            .await?;
        Ok(serde_json::from_str(&payload)?)
    }

    fn call_metrics(&self, log_req: &LogRequest) {
        match serde_json::to_string(log_req) {
            Ok(body) => self.dispatch_post(
                Arc::clone(&self.metrics_transport),
                self.metrics_endpoint.clone(),
                body,
                "Metrics",
            ),
            Err(err) => self
                .diagnostics
                .error(&format!("Could not serialize metrics request: {}", err)),
        }
    }

    fn call_shadow(&self, req: &Request) {
        match serde_json::to_string(req) {
            Ok(body) => self.dispatch_post(
                Arc::clone(&self.delivery_transport),
                self.delivery_endpoint.clone(),
                body,
                "Shadow traffic",
            ),
            Err(err) => self
                .diagnostics
                .error(&format!("Could not serialize shadow request: {}", err)),
        }
    }

    /// Fire-and-forget POST; the reply body is discarded and the outcome only
    /// logged.
    fn dispatch_post(
        &self,
        transport: Arc<dyn Transport>,
        endpoint: String,
        body: String,
        label: &'static str,
    ) {
        let diagnostics = Arc::clone(&self.diagnostics);
        self.pending.dispatch(
            async move { transport.post(&endpoint, body).await },
            move |outcome| match outcome {
                TaskOutcome::Completed(Ok(_)) => {
                    diagnostics.info(&format!("{} request succeeded", label));
                }
                TaskOutcome::Completed(Err(err)) => {
                    diagnostics.error(&format!("{} request failed: {}", label, err));
                }
                TaskOutcome::Panicked(message) => {
                    diagnostics.error(&format!(
                        "{} request could not be completed: {}",
                        label, message
                    ));
                }
                TaskOutcome::Cancelled => {
                    diagnostics.error(&format!("{} request was cancelled before completing", label));
                }
            },
        );
    }
}

/// Dropping a client with calls in flight waits for them when the runtime
/// allows blocking. On a current-thread runtime the calls keep running
/// detached, and any that the runtime drops are logged as cancelled.
impl Drop for DeliveryClient {
    fn drop(&mut self) {
        let pending = self.pending.len();
        if pending == 0 {
            return;
        }

        if self.pending.drain_blocking() {
            self.diagnostics.info(&format!(
                "Delivery client dropped; waited for {} pending tasks",
                pending
            ));
        } else {
            self.diagnostics.error(&format!(
                "Delivery client dropped with {} pending tasks; call shutdown() first",
                pending
            ));
        }
    }
}
