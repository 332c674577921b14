use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of identity characters shown while the identity field is collapsed.
pub const SHORT_IDENTITY_LEN: usize = 8;

pub const UNKNOWN: &str = "Unknown";

/// A node to poll, as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    pub url: String,
    pub network: String,
}

/// What a node reports about itself on its `/info` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeInfo {
    pub version: Option<String>,
    pub version_name: Option<String>,
    pub identity: Option<String>,
    pub connection_string: Option<String>,
    pub peer_list: Option<Vec<Value>>,
}

impl NodeInfo {
    /// Picks the known fields out of an `/info` payload. Anything missing or
    /// unusable is left as `None`; a payload that is not an object yields an
    /// empty `NodeInfo`.
    pub fn from_payload(payload: &Value) -> NodeInfo {
        let field = |key: &str| payload.get(key).and_then(scalar_text);
        NodeInfo {
            version: field("version"),
            version_name: field("version_name"),
            identity: field("identity"),
            connection_string: field("connectionString"),
            peer_list: payload
                .get("peerlist")
                .and_then(Value::as_array)
                .map(|peers| peers.to_vec()),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Outcome of a single health check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthCheckResult {
    pub success: bool,
    pub response_time_millis: Option<u64>,
    pub error_message: Option<String>,
    pub info: Option<NodeInfo>,
}

impl HealthCheckResult {
    pub fn online(response_time_millis: u64, info: NodeInfo) -> HealthCheckResult {
        HealthCheckResult {
            success: true,
            response_time_millis: Some(response_time_millis),
            error_message: None,
            info: Some(info),
        }
    }

    pub fn offline(response_time_millis: Option<u64>, error: impl Into<String>) -> HealthCheckResult {
        let mut error = error.into();
        if error.is_empty() {
            error = "Unknown error".to_string();
        }
        HealthCheckResult {
            success: false,
            response_time_millis,
            error_message: Some(error),
            info: None,
        }
    }
}

/// A configured node together with its latest check; one dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedNodeStatus {
    #[serde(flatten)]
    pub node: NodeConfig,
    pub check: HealthCheckResult,
}

impl AggregatedNodeStatus {
    pub fn new(node: NodeConfig, check: HealthCheckResult) -> AggregatedNodeStatus {
        AggregatedNodeStatus { node, check }
    }

    pub fn state(&self) -> NodeState {
        if self.check.success {
            NodeState::Online
        } else {
            NodeState::Offline
        }
    }

    /// Response time worth showing: only successful checks report one.
    pub fn display_response_time(&self) -> Option<u64> {
        if self.check.success {
            self.check.response_time_millis
        } else {
            None
        }
    }

    fn info_field(&self, pick: impl Fn(&NodeInfo) -> Option<&String>) -> Option<String> {
        self.check.info.as_ref().and_then(pick).cloned()
    }

    pub fn summary(&self) -> NodeStatusSummary {
        NodeStatusSummary {
            name: self.node.name.clone(),
            url: self.node.url.clone(),
            network: self.node.network.clone(),
            status: self.state(),
            response_time: self.display_response_time(),
            version: self.info_field(|i| i.version.as_ref()),
            version_name: self.info_field(|i| i.version_name.as_ref()),
            identity: self.info_field(|i| i.identity.as_ref()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Online,
    Offline,
}

impl NodeState {
    pub fn is_online(self) -> bool {
        self == NodeState::Online
    }

    pub fn css_class(self) -> &'static str {
        match self {
            NodeState::Online => "status-online",
            NodeState::Offline => "status-offline",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeState::Online => "Online",
            NodeState::Offline => "Offline",
        }
    }
}

/// Flattened per-node status served by `/api/status` for the refresh loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatusSummary {
    pub name: String,
    pub url: String,
    pub network: String,
    pub status: NodeState,
    #[serde(rename = "responseTime", default)]
    pub response_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

/// Settings the renderer and the browser loop need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub refresh_interval_millis: u64,
    pub site_title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            refresh_interval_millis: 30_000,
            site_title: "Node Status Dashboard".to_string(),
        }
    }
}

pub fn response_time_label(millis: Option<u64>) -> String {
    match millis {
        Some(ms) => format!("{}ms", ms),
        None => "N/A".to_string(),
    }
}

pub fn version_label(version: Option<&str>, version_name: Option<&str>) -> String {
    let version = version.unwrap_or(UNKNOWN);
    match version_name {
        Some(name) if !name.is_empty() => format!("v{} ({})", version, name),
        _ => format!("v{}", version),
    }
}

pub fn short_identity(identity: &str) -> String {
    identity.chars().take(SHORT_IDENTITY_LEN).collect()
}
