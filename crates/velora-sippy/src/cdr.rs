//! Normalization of softswitch call listings
//!
//! `listAllCalls` items use upper-case SippySoft field names, while other
//! sources send lower-case ones. Each normalized field has an ordered list
//! of accepted keys; the first key holding a non-blank value wins.

use crate::value::Value;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Accepted source keys per normalized field, in priority order
pub struct CdrFieldKeys {
    pub call_id: &'static [&'static str],
    pub caller: &'static [&'static str],
    pub callee: &'static [&'static str],
    pub start_time: &'static [&'static str],
    pub duration: &'static [&'static str],
    pub status: &'static [&'static str],
    pub direction: &'static [&'static str],
    pub incoming_flag: &'static [&'static str],
    pub country: &'static [&'static str],
    pub city: &'static [&'static str],
    pub cost: &'static [&'static str],
    pub trunk: &'static [&'static str],
    pub codec: &'static [&'static str],
}

pub const CDR_FIELD_KEYS: CdrFieldKeys = CdrFieldKeys {
    call_id: &["CALL_ID", "call_id"],
    caller: &["CLI", "caller"],
    callee: &["CLD", "callee"],
    start_time: &["SETUP_TIME", "setup_time"],
    duration: &["DURATION", "duration"],
    status: &["CC_STATE", "status"],
    direction: &["DIRECTION"],
    incoming_flag: &["incoming"],
    country: &["country"],
    city: &["city", "region"],
    cost: &["cost"],
    trunk: &["I_ACCOUNT", "i_account"],
    codec: &["codec"],
};

const UNKNOWN_PARTY: &str = "Unknown";
const DEFAULT_STATUS: &str = "active";

/// One call in the normalized shape served to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CdrRecord {
    pub call_id: String,
    pub caller: String,
    pub callee: String,
    pub start_time: String,
    /// Always null: listed calls are still in progress
    pub end_time: Option<String>,
    pub duration: i64,
    pub status: String,
    pub direction: String,
    pub country: String,
    pub city: String,
    pub cost: f64,
    pub trunk: String,
    pub codec: String,
}

fn lookup<'a>(record: &'a BTreeMap<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_blank())
}

fn text_or(record: &BTreeMap<String, Value>, keys: &[&str], default: &str) -> String {
    lookup(record, keys)
        .map(|v| v.to_string())
        .unwrap_or_else(|| default.to_string())
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Double(d) => Some(d.trunc() as i64),
        Value::Boolean(b) => Some(i64::from(*b)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|d| d.trunc() as i64))
        }
        _ => None,
    }
}

fn float(value: &Value) -> Option<f64> {
    match value {
        Value::Double(d) => Some(*d),
        Value::Integer(i) => Some(*i as f64),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

impl CdrRecord {
    /// Build a record from one `listAllCalls` struct
    pub fn from_struct(record: &BTreeMap<String, Value>) -> Self {
        let keys = &CDR_FIELD_KEYS;

        let duration = lookup(record, keys.duration)
            .map(|v| {
                integer(v).unwrap_or_else(|| {
                    warn!("Unparsable call duration: {}", v);
                    0
                })
            })
            .unwrap_or(0);

        let cost = lookup(record, keys.cost)
            .map(|v| {
                float(v).unwrap_or_else(|| {
                    warn!("Unparsable call cost: {}", v);
                    0.0
                })
            })
            .unwrap_or(0.0);

        let direction = match lookup(record, keys.direction) {
            Some(d) => d.to_string(),
            None => {
                let incoming = lookup(record, keys.incoming_flag)
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if incoming { "inbound" } else { "outbound" }.to_string()
            }
        };

        Self {
            call_id: text_or(record, keys.call_id, ""),
            caller: text_or(record, keys.caller, UNKNOWN_PARTY),
            callee: text_or(record, keys.callee, UNKNOWN_PARTY),
            start_time: lookup(record, keys.start_time)
                .map(|v| v.to_string())
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
            end_time: None,
            duration,
            status: text_or(record, keys.status, DEFAULT_STATUS),
            direction,
            country: text_or(record, keys.country, ""),
            city: text_or(record, keys.city, ""),
            cost,
            trunk: text_or(record, keys.trunk, ""),
            codec: text_or(record, keys.codec, ""),
        }
    }
}

/// Normalize every struct item; other items are skipped
pub fn normalize_calls(items: &[Value]) -> Vec<CdrRecord> {
    items
        .iter()
        .filter_map(Value::as_struct)
        .map(CdrRecord::from_struct)
        .collect()
}

/// Client-side `offset`/`limit` window
pub fn paginate<T>(records: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    records.into_iter().skip(offset).take(limit).collect()
}
