use crate::types::{
    CohortMembership, DeliveryExecution, DeliveryLog, ExecutionServer, LogRequest, Request, Response,
};

/// Version reported in the execution record of locally served requests.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the metrics payload for one served call.
///
/// A delivery log is only attached when the request was served locally; the
/// remote service logs its own deliveries.
pub fn make_log_request(
    req: &Request,
    resp: &Response,
    did_sdk_delivery: bool,
    experiment: Option<&CohortMembership>,
) -> LogRequest {
    let mut log_req = LogRequest {
        platform_id: req.platform_id,
        user_info: req.user_info.clone(),
        client_info: req.client_info.clone(),
        timing: req.timing.clone(),
        ..LogRequest::default()
    };

    if did_sdk_delivery {
        log_req.delivery_log.push(DeliveryLog {
            request: req.clone(),
            response: resp.clone(),
            execution: DeliveryExecution {
                execution_server: ExecutionServer::Sdk,
                server_version: SERVER_VERSION.to_string(),
            },
        });
    }

    if let Some(experiment) = experiment {
        log_req.cohort_membership.push(experiment.clone());
    }

    log_req
}
