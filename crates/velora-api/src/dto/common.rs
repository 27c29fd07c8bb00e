//! Common DTOs used across the API

use serde::Serialize;

/// `{ok, message}` acknowledgement of a lifecycle action
#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    pub ok: bool,
    pub message: String,
}

impl OkResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }
}

/// `{success, message}` acknowledgement used by the CRM routes
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledgements() {
        let ok = serde_json::to_value(OkResponse::ok("Campaign started")).unwrap();
        assert_eq!(ok, serde_json::json!({"ok": true, "message": "Campaign started"}));

        let success = SuccessResponse::success("done");
        assert!(success.success);
    }
}
