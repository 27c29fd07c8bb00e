//! Softswitch DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;
use velora_sippy::{ListCallsParams, Value};

fn default_limit() -> usize {
    100
}

fn default_true() -> bool {
    true
}

/// Query of `GET /api/sippy/cdrs`; paging is applied after the fetch
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CdrQueryParams {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 10000))]
    pub limit: usize,

    #[serde(default)]
    pub offset: usize,

    #[serde(default)]
    pub i_customer: String,

    #[serde(default = "default_true")]
    pub recursive: bool,

    pub order: Option<String>,
}

impl CdrQueryParams {
    pub fn list_params(&self) -> ListCallsParams {
        ListCallsParams {
            i_customer: self.i_customer.clone(),
            recursive: self.recursive,
            order: self.order.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CallMethodRequest {
    #[validate(length(min = 1, message = "method is required"))]
    pub method: String,

    #[serde(default)]
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallMethodResponse {
    pub ok: bool,
    pub method: String,
    pub result: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SippyHealthResponse {
    pub ok: bool,
    pub message: String,
    pub details: serde_json::Value,
}
