//! Campaign and script DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use velora_core::models::{CallStatus, CampaignStatus, StopMode};
use velora_services::{CampaignChanges, NewCampaign, NewScript};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScriptCreateRequest {
    #[validate(length(min = 1, message = "Script name is required"))]
    pub name: String,

    pub language: Option<String>,

    #[validate(length(min = 1, message = "Script text is required"))]
    pub text: String,

    #[serde(default)]
    pub variables: Vec<String>,

    pub voice_id: Option<String>,
}

impl From<ScriptCreateRequest> for NewScript {
    fn from(req: ScriptCreateRequest) -> Self {
        Self {
            name: req.name,
            language: req.language,
            text: req.text,
            variables: req.variables,
            voice_id: req.voice_id,
        }
    }
}

fn default_list_limit() -> i64 {
    50
}

fn default_call_limit() -> i64 {
    100
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScriptListParams {
    #[serde(default = "default_list_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub skip: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CampaignCreateRequest {
    #[validate(length(min = 1, message = "Campaign name is required"))]
    pub name: String,

    pub script_id: Uuid,

    #[validate(length(min = 1, message = "trunk is required"))]
    pub trunk: String,

    pub context: Option<String>,

    #[validate(range(min = 1, max = 10))]
    pub concurrency: Option<i32>,

    pub numbers: Vec<String>,

    pub schedule: Option<serde_json::Value>,
}

impl From<CampaignCreateRequest> for NewCampaign {
    fn from(req: CampaignCreateRequest) -> Self {
        Self {
            name: req.name,
            script_id: req.script_id,
            trunk: req.trunk,
            context: req.context,
            concurrency: req.concurrency,
            numbers: req.numbers,
            schedule: req.schedule,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CampaignListParams {
    pub status: Option<CampaignStatus>,

    #[serde(default = "default_list_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub skip: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CampaignUpdateRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,

    #[validate(range(min = 1, max = 10))]
    pub concurrency: Option<i32>,

    pub schedule: Option<serde_json::Value>,
}

impl From<CampaignUpdateRequest> for CampaignChanges {
    fn from(req: CampaignUpdateRequest) -> Self {
        Self {
            name: req.name,
            concurrency: req.concurrency,
            schedule: req.schedule,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopParams {
    #[serde(default)]
    pub mode: StopMode,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CallLogListParams {
    pub status: Option<CallStatus>,

    #[serde(default = "default_call_limit")]
    #[validate(range(min = 1, max = 500))]
    pub limit: i64,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub skip: i64,
}
