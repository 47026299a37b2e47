use crate::types::{ClientInfo, ClientType, CohortArm, CohortMembership, Request, Timing, TrafficType};
use uuid::Uuid;

/// Current time in milliseconds since the unix epoch.
pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Fills the fields every outbound request needs. Idempotent, except that a
/// zero client timestamp is only stamped by the first call.
///
/// Client and traffic type are always overwritten, not merged.
pub fn fill_necessary_fields(req: &mut Request) {
    let client_info = req.client_info.get_or_insert_with(ClientInfo::default);
    client_info.client_type = ClientType::PlatformServer;
    client_info.traffic_type = TrafficType::Production;

    if req.client_request_id.trim().is_empty() {
        req.client_request_id = Uuid::new_v4().to_string();
    }

    let timing = req.timing.get_or_insert_with(Timing::default);
    if timing.client_log_timestamp == 0 {
        timing.client_log_timestamp = now_millis();
    }
}

/// Lists problems with a caller-supplied request. Advisory only; callers log
/// these and carry on.
pub fn validate(req: &Request) -> Vec<String> {
    let mut problems = Vec::new();

    if !req.request_id.is_empty() {
        problems.push("Request.requestId should not be set".to_string());
    }
    if req.user_info.is_none() {
        problems.push("Request.userInfo should be set".to_string());
    }
    if req.insertion.is_empty() {
        problems.push("Request.insertion should be set".to_string());
    }

    for (i, insertion) in req.insertion.iter().enumerate() {
        if !insertion.insertion_id.is_empty() {
            problems.push(format!("Insertion[{}].insertionId should not be set", i));
        }
        if insertion.content_id.is_empty() {
            problems.push(format!("Insertion[{}].contentId should be set", i));
        }
    }

    problems
}

/// Marks a request copy as shadow traffic.
pub fn convert_to_shadow_request(req: &mut Request) {
    req.client_info
        .get_or_insert_with(ClientInfo::default)
        .traffic_type = TrafficType::Shadow;
}

pub fn is_in_control(experiment: Option<&CohortMembership>) -> bool {
    matches!(experiment, Some(membership) if membership.arm == CohortArm::Control)
}
