//! Status check DTOs

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusCheckCreateRequest {
    #[validate(length(min = 1, max = 255, message = "client_name is required"))]
    pub client_name: String,
}
