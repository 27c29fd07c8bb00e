//! HTTP request handlers

pub mod call;
pub mod campaign;
pub mod chatbot;
pub mod customer;
pub mod dealer;
pub mod elevenlabs;
pub mod issabel;
pub mod mm;
pub mod sippy;
pub mod statistics;
pub mod status;
pub mod tariff;
pub mod trunk;

use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::json;

pub use campaign::configure as configure_campaigns;
pub use chatbot::configure as configure_chatbot;
pub use elevenlabs::configure as configure_elevenlabs;
pub use issabel::configure as configure_issabel;
pub use mm::configure as configure_mm;
pub use sippy::configure as configure_sippy;
pub use status::configure as configure_status;

/// Routes under `/voip-crm`
pub fn configure_voip_crm(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/voip-crm")
            .configure(dealer::configure)
            .configure(customer::configure)
            .configure(trunk::configure)
            .configure(call::configure)
            .configure(tariff::configure)
            .configure(statistics::configure),
    );
}

/// Error body for vendor failures that keep the vendor's status code
pub(crate) fn upstream_error(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
    details: serde_json::Value,
) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "error": code,
        "message": message.into(),
        "status": status.as_u16(),
        "details": details,
    }))
}

/// Vendor status as an actix status, 502 when out of range
pub(crate) fn vendor_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}
