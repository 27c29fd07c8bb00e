//! SIP trunk settings model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-customer SIP trunk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrunkSettings {
    /// Customer this trunk belongs to
    pub customer_id: Uuid,

    /// Remote SIP peer address
    pub ip_address: String,

    pub port: i32,

    /// Preferred codec, e.g. `G.711`
    pub codec: String,

    /// Transport protocol (`UDP`, `TCP`, `TLS`)
    pub protocol: String,

    /// Maximum concurrent calls on the trunk
    pub max_calls: i32,

    pub auth_username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_password: Option<String>,

    /// Registration refresh interval in seconds
    pub register_interval: i32,

    pub nat_traversal: bool,
}

impl TrunkSettings {
    /// Address in `host:port` form
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.ip_address, self.port)
    }

    /// Whether the trunk registers with credentials
    pub fn uses_registration(&self) -> bool {
        self.auth_username.as_deref().is_some_and(|u| !u.is_empty())
    }
}

impl Default for TrunkSettings {
    fn default() -> Self {
        Self {
            customer_id: Uuid::nil(),
            ip_address: String::new(),
            port: 5060,
            codec: "G.711".to_string(),
            protocol: "UDP".to_string(),
            max_calls: 10,
            auth_username: None,
            auth_password: None,
            register_interval: 3600,
            nat_traversal: true,
        }
    }
}
