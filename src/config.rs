use crate::error::ConfigError;
use crate::options::DeliveryClientOptions;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 250;
const DEFAULT_METRICS_TIMEOUT_MS: u64 = 3_000;

/// Connection settings for one remote endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Everything needed to build a [`crate::DeliveryClient`] backed by HTTP.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub delivery: EndpointConfig,
    pub metrics: EndpointConfig,
    pub options: DeliveryClientOptions,
}

impl ClientConfig {
    /// Loads configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let delivery = EndpointConfig {
            endpoint: required(&lookup, "DELIVERY_ENDPOINT")?,
            api_key: lookup("DELIVERY_API_KEY").unwrap_or_default(),
            timeout: Duration::from_millis(parse_or(
                &lookup,
                "DELIVERY_TIMEOUT_MS",
                DEFAULT_DELIVERY_TIMEOUT_MS,
            )?),
        };

        let metrics = EndpointConfig {
            endpoint: required(&lookup, "METRICS_ENDPOINT")?,
            api_key: lookup("METRICS_API_KEY").unwrap_or_default(),
            timeout: Duration::from_millis(parse_or(
                &lookup,
                "METRICS_TIMEOUT_MS",
                DEFAULT_METRICS_TIMEOUT_MS,
            )?),
        };

        let options = DeliveryClientOptions::new()
            .with_shadow_traffic_rate(parse_or(&lookup, "SHADOW_TRAFFIC_RATE", 0.0f32)?)?
            .with_validate(parse_or(&lookup, "VALIDATE_REQUESTS", false)?);

        Ok(Self {
            delivery,
            metrics,
            options,
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing { name }),
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
