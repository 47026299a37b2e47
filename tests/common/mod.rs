#![allow(dead_code)]

use delivery_client::transport::FakeTransport;
use delivery_client::types::{Insertion, Request, Response, UserInfo};
use delivery_client::{DeliveryClient, DeliveryClientOptions, Diagnostics};
use std::sync::{Arc, Mutex};

pub const DELIVERY_ENDPOINT: &str = "abc";
pub const METRICS_ENDPOINT: &str = "def";

/// Diagnostics sink that keeps every message.
#[derive(Default)]
pub struct RecordingDiagnostics {
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

pub struct Harness {
    pub client: DeliveryClient,
    pub delivery: FakeTransport,
    pub metrics: FakeTransport,
    pub diagnostics: Arc<RecordingDiagnostics>,
}

pub fn harness(delivery: FakeTransport, metrics: FakeTransport, options: DeliveryClientOptions) -> Harness {
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let client = DeliveryClient::new(
        Arc::new(delivery.clone()),
        DELIVERY_ENDPOINT,
        Arc::new(metrics.clone()),
        METRICS_ENDPOINT,
        options,
    )
    .with_diagnostics(diagnostics.clone());

    Harness {
        client,
        delivery,
        metrics,
        diagnostics,
    }
}

pub fn remote_response() -> Response {
    Response {
        request_id: "remote-request-id".to_string(),
        insertion: vec![Insertion {
            insertion_id: "remote-insertion".to_string(),
            content_id: "5".to_string(),
            position: Some(0),
        }],
    }
}

pub fn six_insertion_request() -> Request {
    Request {
        platform_id: 7,
        user_info: Some(UserInfo {
            log_user_id: "log-user".to_string(),
            ..UserInfo::default()
        }),
        insertion: (0..6).map(|i| Insertion::with_content_id(i.to_string())).collect(),
        ..Request::default()
    }
}
