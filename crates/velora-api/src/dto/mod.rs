//! Data Transfer Objects (DTOs) for API requests and responses

pub mod campaign;
pub mod chatbot;
pub mod common;
pub mod crm;
pub mod sippy;
pub mod status;
pub mod vendor;

pub use campaign::*;
pub use chatbot::*;
pub use common::*;
pub use crm::*;
pub use sippy::*;
pub use status::*;
pub use vendor::*;
