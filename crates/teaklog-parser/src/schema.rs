//! Serde shapes of the JSON bodies the SDK logs.
//!
//! Only the fields the engine reads are declared; everything else in a body
//! is ignored (or kept in a flattened map where the engine stores it).

use serde::Deserialize;
use serde_json::{Map, Value};

/// `Teak@<id>: {"android":"2.1.0"}`
#[derive(Debug, Deserialize)]
pub struct InitRecord {
    #[serde(default)]
    pub android: Option<String>,
}

/// `State@<id>: {"previousState":"Allocated","state":"Created"}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    #[serde(default)]
    pub previous_state: Option<String>,
    pub state: String,
}

/// `Lifecycle@<id>: {"callback":"onActivityCreated", ...}`
#[derive(Debug, Deserialize)]
pub struct LifecycleRecord {
    pub callback: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// `io.teak.sdk.Session@<id>: {"startDate":1500000000, ...}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub start_date: i64,
}

/// `Heartbeat@<id>: {"timestamp":1500000060, "userId":"..."}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRecord {
    pub timestamp: i64,
}

/// `Request@<id>: {"request_id":"...","endpoint":"/games/1/users.json","session":"ff01","payload":{...}}`
#[derive(Debug, Deserialize)]
pub struct RequestRecord {
    #[serde(default)]
    pub request_id: Option<String>,
    pub session: String,
    pub endpoint: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

/// `Reply@<id>: {"request_id":"...","session":"ff01","payload":{...},"response_time":12.5}`
#[derive(Debug, Deserialize)]
pub struct ReplyRecord {
    #[serde(default)]
    pub request_id: Option<String>,
    pub session: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub response_time: Option<f64>,
}
