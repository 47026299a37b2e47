/// Shadow traffic is only sent when remote delivery was never attempted.
mod common;

use common::{harness, remote_response, six_insertion_request, DELIVERY_ENDPOINT, METRICS_ENDPOINT};
use delivery_client::transport::FakeTransport;
use delivery_client::types::{ClientType, CohortArm, CohortMembership, Request, TrafficType};
use delivery_client::{DeliveryClientOptions, DeliveryRequestOptions};

fn always_shadow() -> DeliveryClientOptions {
    DeliveryClientOptions::new().with_shadow_traffic_rate(1.0).unwrap()
}

#[tokio::test]
async fn test_shadow_sent_when_remote_skipped() {
    let h = harness(FakeTransport::new(), FakeTransport::new(), always_shadow());
    // Only log to metrics to dodge the delivery service.
    let options = DeliveryRequestOptions::new().with_only_log_to_metrics(true);

    let resp = h.client.deliver(six_insertion_request(), Some(options)).await.unwrap();
    h.client.shutdown().await;

    // The only delivery call is the shadow one.
    let calls = h.delivery.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].endpoint, DELIVERY_ENDPOINT);
    assert_eq!(h.metrics.call_count().await, 1);

    let shadow: Request = calls[0].parse().unwrap();
    let client_info = shadow.client_info.unwrap();
    assert_eq!(client_info.traffic_type, TrafficType::Shadow);
    assert_eq!(client_info.client_type, ClientType::PlatformServer);
    assert_ne!(shadow.request_id, resp.request_id);
    assert_eq!(shadow.insertion.len(), 6);
    assert!(shadow.insertion.iter().all(|i| i.insertion_id.is_empty()));
}

#[tokio::test]
async fn test_shadow_sent_for_control_arm() {
    let h = harness(FakeTransport::new(), FakeTransport::new(), always_shadow());
    let options = DeliveryRequestOptions::new()
        .with_experiment(CohortMembership::new("cohort", CohortArm::Control));

    h.client.deliver(six_insertion_request(), Some(options)).await.unwrap();
    h.client.shutdown().await;

    assert_eq!(h.delivery.call_count().await, 1);
}

#[tokio::test]
async fn test_no_shadow_after_failed_remote_attempt() {
    let h = harness(FakeTransport::new(), FakeTransport::new(), always_shadow());

    h.client.deliver(six_insertion_request(), None).await.unwrap();
    h.client.shutdown().await;

    // Just the real (failed) delivery attempt.
    let calls = h.delivery.calls().await;
    assert_eq!(calls.len(), 1);
    let sent: Request = calls[0].parse().unwrap();
    assert_eq!(sent.client_info.unwrap().traffic_type, TrafficType::Production);
}

#[tokio::test]
async fn test_no_shadow_after_successful_remote_attempt() {
    let h = harness(
        FakeTransport::new().with_response(&remote_response()).unwrap(),
        FakeTransport::new(),
        always_shadow(),
    );

    h.client.deliver(six_insertion_request(), None).await.unwrap();
    h.client.shutdown().await;

    assert_eq!(h.delivery.call_count().await, 1);
}

#[tokio::test]
async fn test_zero_rate_never_shadows() {
    let h = harness(FakeTransport::new(), FakeTransport::new(), DeliveryClientOptions::default());
    let options = DeliveryRequestOptions::new().with_only_log_to_metrics(true);

    for _ in 0..20 {
        h.client
            .deliver(six_insertion_request(), Some(options.clone()))
            .await
            .unwrap();
    }
    h.client.shutdown().await;

    assert_eq!(h.delivery.call_count().await, 0);
    assert_eq!(h.metrics.call_count().await, 20);
}

#[tokio::test]
async fn test_shadow_failure_only_logged() {
    let h = harness(FakeTransport::new(), FakeTransport::new(), always_shadow());
    let options = DeliveryRequestOptions::new().with_only_log_to_metrics(true);

    let resp = h.client.deliver(six_insertion_request(), Some(options)).await.unwrap();
    h.client.shutdown().await;

    assert_eq!(resp.insertion.len(), 6);
    assert!(h
        .diagnostics
        .errors()
        .iter()
        .any(|e| e.starts_with("Shadow traffic request failed")));
}

// The current-thread runtime runs spawned tasks in spawn order, so the shared
// call log shows dispatch order.
#[tokio::test]
async fn test_metrics_dispatched_before_shadow() {
    let shared = FakeTransport::new();
    let h = harness(shared.clone(), shared.clone(), always_shadow());
    let options = DeliveryRequestOptions::new().with_only_log_to_metrics(true);

    h.client.deliver(six_insertion_request(), Some(options)).await.unwrap();
    h.client.shutdown().await;

    let endpoints: Vec<String> = shared.calls().await.into_iter().map(|c| c.endpoint).collect();
    assert_eq!(endpoints, vec![METRICS_ENDPOINT, DELIVERY_ENDPOINT]);
}
