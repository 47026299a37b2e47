//! Manual consumer: builds a client from the environment, sends one request
//! and waits for background calls before exiting.
//!
//! Requires `DELIVERY_ENDPOINT` and `METRICS_ENDPOINT` (see `ClientConfig`).

use delivery_client::types::{Insertion, Paging, Request, UserInfo};
use delivery_client::{ClientConfig, DeliveryClient, DynError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), DynError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    let client = DeliveryClient::from_config(config)?;

    let req = Request {
        platform_id: 0,
        user_info: Some(UserInfo {
            log_user_id: "manual-consumer".to_string(),
            ..UserInfo::default()
        }),
        insertion: (0..10)
            .map(|i| Insertion::with_content_id(format!("content-{}", i)))
            .collect(),
        paging: Some(Paging { offset: 0, size: 5 }),
        ..Request::default()
    };
    tracing::info!("Request:\t{}", serde_json::to_string(&req)?);

    let resp = client.deliver(req, None).await?;
    tracing::info!("Response:\t{}", serde_json::to_string(&resp)?);

    client.shutdown().await;
    Ok(())
}
