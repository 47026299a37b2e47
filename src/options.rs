use crate::error::{DeliveryError, Result};
use crate::types::CohortMembership;

/// Process-lifetime options for a [`crate::DeliveryClient`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryClientOptions {
    shadow_traffic_rate: f32,
    /// Run advisory request validation and log every problem found.
    pub validate: bool,
}

impl DeliveryClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shadow_traffic_rate(&self) -> f32 {
        self.shadow_traffic_rate
    }

    /// Fraction of locally served calls that also send a shadow request.
    /// Must be within [0, 1].
    pub fn set_shadow_traffic_rate(&mut self, rate: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(DeliveryError::configuration(format!(
                "shadow traffic rate must be between 0 and 1, inclusive (got {})",
                rate
            )));
        }
        self.shadow_traffic_rate = rate;
        Ok(())
    }

    pub fn with_shadow_traffic_rate(mut self, rate: f32) -> Result<Self> {
        self.set_shadow_traffic_rate(rate)?;
        Ok(self)
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// Per-call options for [`crate::DeliveryClient::deliver`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryRequestOptions {
    /// Skip remote delivery and serve locally, logging to metrics only.
    pub only_log_to_metrics: bool,
    /// Experiment assignment for this call. A control arm bypasses remote
    /// delivery.
    pub experiment: Option<CohortMembership>,
    retrieval_insertion_offset: i32,
}

impl DeliveryRequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retrieval_insertion_offset(&self) -> i32 {
        self.retrieval_insertion_offset
    }

    /// Offset at which the request's insertions were retrieved. Must be >= 0.
    pub fn set_retrieval_insertion_offset(&mut self, offset: i32) -> Result<()> {
        if offset < 0 {
            return Err(DeliveryError::configuration(format!(
                "retrieval insertion offset must be greater than or equal to 0 (got {})",
                offset
            )));
        }
        self.retrieval_insertion_offset = offset;
        Ok(())
    }

    pub fn with_retrieval_insertion_offset(mut self, offset: i32) -> Result<Self> {
        self.set_retrieval_insertion_offset(offset)?;
        Ok(self)
    }

    pub fn with_only_log_to_metrics(mut self, only_log_to_metrics: bool) -> Self {
        self.only_log_to_metrics = only_log_to_metrics;
        self
    }

    pub fn with_experiment(mut self, experiment: CohortMembership) -> Self {
        self.experiment = Some(experiment);
        self
    }
}
