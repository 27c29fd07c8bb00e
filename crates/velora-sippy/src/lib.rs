//! SippySoft softswitch integration
//!
//! A small XML-RPC stack for the SippySoft management API:
//!
//! - [`Value`]: the XML-RPC value model, convertible to and from JSON
//! - [`build_request`] / [`parse_response`]: the `methodCall` /
//!   `methodResponse` wire format
//! - [`DigestChallenge`]: HTTP Digest (RFC 2617, MD5) handshake
//! - [`SippyClient`]: request/challenge/retry round trips
//! - [`cdr`]: normalization of `listAllCalls` results into [`CdrRecord`]s
//!
//! # Example
//!
//! ```rust,ignore
//! let client = SippyClient::new(&config.sippy)?;
//! let calls = client.list_all_calls(&ListCallsParams::default()).await?;
//! let records = paginate(normalize_calls(&calls), 0, 100);
//! ```

pub mod cdr;
mod client;
mod digest;
mod error;
mod request;
mod response;
mod value;

pub use cdr::{normalize_calls, paginate, CdrRecord};
pub use client::{ListCallsParams, SippyClient};
pub use digest::{DigestChallenge, FixedNonce, NonceSource, RandomNonce};
pub use error::SippyError;
pub use request::build_request;
pub use response::parse_response;
pub use value::Value;
