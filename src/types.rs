use serde::{Deserialize, Serialize};

// ============================================================================
// Common
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientType {
    #[default]
    UnknownRequestClient,
    PlatformServer,
    PlatformClient,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrafficType {
    #[default]
    UnknownTrafficType,
    Production,
    Replay,
    Shadow,
}

/// Tags describing who sent the request and what kind of traffic it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInfo {
    pub client_type: ClientType,
    pub traffic_type: TrafficType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub log_user_id: String,
    pub is_internal_user: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timing {
    /// Milliseconds since the unix epoch, stamped by the client.
    pub client_log_timestamp: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub event_api_timestamp: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

// ============================================================================
// Delivery
// ============================================================================

/// One candidate content item. `insertion_id` and `position` are assigned by
/// whichever path serves the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insertion {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub insertion_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
}

impl Insertion {
    pub fn with_content_id(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            ..Self::default()
        }
    }
}

/// Window into the candidate list. A non-positive `size` means "rest of list".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paging {
    pub offset: i32,
    pub size: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Request {
    pub platform_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
    /// Assigned by the serving path only; callers must leave it empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_request_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub insertion: Vec<Insertion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Response {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub insertion: Vec<Insertion>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionServer {
    #[default]
    UnknownExecutionServer,
    Api,
    Sdk,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryExecution {
    pub execution_server: ExecutionServer,
    pub server_version: String,
}

/// Record of a request served outside the remote delivery service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryLog {
    pub request: Request,
    pub response: Response,
    pub execution: DeliveryExecution,
}

// ============================================================================
// Event
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CohortArm {
    #[default]
    UnknownGroup,
    Control,
    Treatment,
}

/// Experiment assignment for a single call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CohortMembership {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cohort_id: String,
    pub arm: CohortArm,
}

impl CohortMembership {
    pub fn new(cohort_id: impl Into<String>, arm: CohortArm) -> Self {
        Self {
            cohort_id: cohort_id.into(),
            arm,
        }
    }
}

/// Payload sent to the metrics endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogRequest {
    pub platform_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delivery_log: Vec<DeliveryLog>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cohort_membership: Vec<CohortMembership>,
}
