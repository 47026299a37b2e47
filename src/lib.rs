use std::error::Error;

pub type DynError = Box<dyn Error + Send + Sync>;

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fallback;
pub mod metrics;
pub mod options;
pub mod request_processor;
pub mod sampling;
pub mod task_registry;
pub mod transport;
pub mod types;

pub use client::DeliveryClient;
pub use config::ClientConfig;
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use error::{ConfigError, DeliveryError, Result, TransportError};
pub use options::{DeliveryClientOptions, DeliveryRequestOptions};
