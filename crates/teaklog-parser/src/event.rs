use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use teaklog_types::{LogCategory, Transition};

/// Events logged under the `Teak` tag. They target the run history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TeakEvent {
    Init {
        id: String,
        sdk_version: Option<String>,
    },
    StateTransition {
        id: String,
        transition: Transition,
    },
    Lifecycle {
        id: String,
        callback: String,
        /// Body fields besides `callback`
        fields: Map<String, Value>,
    },
    AppConfigRegistered {
        id: String,
        config: Map<String, Value>,
    },
    DeviceConfigRegistered {
        id: String,
        config: Map<String, Value>,
    },
    /// Known shape with no modeled state (`RemoteConfiguration`, `IdentifyUser`, `Notification`)
    Unmodeled { type_name: String },
}

/// Events logged under the `Teak.Session` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionCreated {
        id: String,
        start_date: DateTime<Utc>,
    },
    SessionStateTransition {
        id: String,
        transition: Transition,
    },
    Heartbeat {
        id: String,
        timestamp: DateTime<Utc>,
    },
    Unmodeled { type_name: String },
}

/// Events logged under the `Teak.Request` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestEvent {
    RequestAttached {
        request_id: String,
        session_id: String,
        endpoint: String,
        hostname: Option<String>,
        payload: Map<String, Value>,
    },
    ReplyAttached {
        request_id: String,
        session_id: String,
        payload: Value,
        response_time: Option<f64>,
    },
}

/// A decoded tagged line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", content = "event", rename_all = "snake_case")]
pub enum LogEvent {
    Teak(TeakEvent),
    Session(SessionEvent),
    Request(RequestEvent),
}

impl LogEvent {
    pub fn category(&self) -> LogCategory {
        match self {
            LogEvent::Teak(_) => LogCategory::Teak,
            LogEvent::Session(_) => LogCategory::Session,
            LogEvent::Request(_) => LogCategory::Request,
        }
    }

    /// Known shape that carries no modeled state.
    pub fn is_unmodeled(&self) -> bool {
        matches!(
            self,
            LogEvent::Teak(TeakEvent::Unmodeled { .. })
                | LogEvent::Session(SessionEvent::Unmodeled { .. })
        )
    }
}
