//! Plain-text and JSON projections printed on stdout.

use serde::Serialize;
use serde_json::{Map, Value};
use teaklog_engine::RunHistory;

/// Where the SDK and its current session stand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateView {
    pub sdk_state: String,
    pub sdk_previous_state: Option<String>,
    pub session: Option<SessionStateView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStateView {
    pub id: String,
    pub state: String,
    pub previous_state: Option<String>,
}

impl StateView {
    pub fn from_history(history: &RunHistory) -> Self {
        Self {
            sdk_state: history.current_state().to_string(),
            sdk_previous_state: history.previous_state().map(String::from),
            session: history.current_session().map(|session| SessionStateView {
                id: session.id().to_string(),
                state: session.current_state().to_string(),
                previous_state: session.previous_state().map(String::from),
            }),
        }
    }

    pub fn to_plain(&self) -> String {
        let mut out = format!(
            "Teak: {}",
            with_origin(&self.sdk_state, self.sdk_previous_state.as_deref())
        );
        match &self.session {
            Some(session) => out.push_str(&format!(
                "\nSession {}: {}",
                session.id,
                with_origin(&session.state, session.previous_state.as_deref())
            )),
            None => out.push_str("\nSession: none"),
        }
        out
    }
}

fn with_origin(state: &str, previous: Option<&str>) -> String {
    match previous {
        Some(previous) => format!("{} (from {})", state, previous),
        None => state.to_string(),
    }
}

/// Pretty JSON for humans; single-line JSON for callers that read one line.
pub fn json_text(value: &Value, pretty: bool) -> String {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.unwrap_or_else(|_| value.to_string())
}

pub fn object_value(map: &Map<String, Value>) -> Value {
    Value::Object(map.clone())
}
