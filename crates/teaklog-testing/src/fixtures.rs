//! Sample logs.
//!
//! `FULL_RUN_LOG` is a recorded threadtime capture of one app launch: SDK
//! init, configuration, one expired session with two registrations and a
//! second session that was just created. `LogBuilder` writes synthetic
//! lines in the same layout.

use serde_json::{Value, json};

pub const FULL_RUN_LOG: &str = include_str!("../fixtures/full_run.logcat");

const PID: u32 = 4242;
const STEP_MS: u64 = 10;

/// Fluent writer for logcat text in `threadtime` layout.
///
/// # Example
/// ```
/// use teaklog_testing::LogBuilder;
///
/// let log = LogBuilder::new()
///     .init("1a2b", "2.1.0")
///     .sdk_state("1a2b", "Allocated", "Created")
///     .build();
/// assert_eq!(log.lines().count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogBuilder {
    lines: Vec<String>,
    clock_ms: u64,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn timestamp(&mut self) -> String {
        self.clock_ms += STEP_MS;
        let ms = self.clock_ms;
        format!(
            "05-16 10:{:02}:{:02}.{:03}",
            (ms / 60_000) % 60,
            (ms / 1000) % 60,
            ms % 1000
        )
    }

    /// Next synthetic object id, unique per builder.
    fn object_id(&self) -> String {
        format!("{:x}", 0x7e00 + self.lines.len())
    }

    /// Append a line verbatim.
    pub fn raw(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Append `<tag>: <payload>` with a threadtime prefix.
    pub fn tagged(mut self, tag: &str, payload: impl AsRef<str>) -> Self {
        let timestamp = self.timestamp();
        self.lines.push(format!(
            "{}  {}  {} D {:<8}: {}",
            timestamp,
            PID,
            PID,
            tag,
            payload.as_ref()
        ));
        self
    }

    pub fn teak_object(self, type_name: &str, id: &str, body: Value) -> Self {
        self.tagged("Teak", format!("{}@{}: {}", type_name, id, body))
    }

    pub fn session_object(self, type_name: &str, id: &str, body: Value) -> Self {
        self.tagged("Teak.Session", format!("{}@{}: {}", type_name, id, body))
    }

    pub fn request_object(self, type_name: &str, id: &str, body: Value) -> Self {
        self.tagged("Teak.Request", format!("{}@{}: {}", type_name, id, body))
    }

    pub fn init(self, id: &str, version: &str) -> Self {
        self.teak_object("io.teak.sdk.Teak", id, json!({ "android": version }))
    }

    pub fn sdk_state(self, id: &str, from: &str, to: &str) -> Self {
        self.teak_object("State", id, json!({ "previousState": from, "state": to }))
    }

    pub fn app_configuration(self, id: &str, body: Value) -> Self {
        self.teak_object("io.teak.sdk.AppConfiguration", id, body)
    }

    pub fn device_configuration(self, id: &str, body: Value) -> Self {
        self.teak_object("io.teak.sdk.DeviceConfiguration", id, body)
    }

    pub fn lifecycle(self, id: &str, callback: &str) -> Self {
        self.teak_object("Lifecycle", id, json!({ "callback": callback }))
    }

    pub fn activity_created(self, id: &str, app_config: &str, device_config: &str) -> Self {
        self.teak_object(
            "Lifecycle",
            id,
            json!({
                "callback": "onActivityCreated",
                "appConfiguration": app_config,
                "deviceConfiguration": device_config,
            }),
        )
    }

    pub fn session_created(self, id: &str, start_date: i64) -> Self {
        self.session_object("io.teak.sdk.Session", id, json!({ "startDate": start_date }))
    }

    pub fn session_state(self, id: &str, from: &str, to: &str) -> Self {
        self.session_object("State", id, json!({ "previousState": from, "state": to }))
    }

    pub fn heartbeat(self, id: &str, timestamp: i64) -> Self {
        self.session_object("Heartbeat", id, json!({ "timestamp": timestamp }))
    }

    pub fn request(self, request_id: &str, session: &str, endpoint: &str, payload: Value) -> Self {
        let object_id = self.object_id();
        self.request_object(
            "io.teak.sdk.Request",
            &object_id,
            json!({
                "request_id": request_id,
                "endpoint": endpoint,
                "session": session,
                "payload": payload,
            }),
        )
    }

    pub fn reply(self, request_id: &str, session: &str, payload: Value) -> Self {
        let object_id = self.object_id();
        self.request_object(
            "Reply",
            &object_id,
            json!({
                "request_id": request_id,
                "session": session,
                "payload": payload,
            }),
        )
    }

    /// The log text, one line per entry with a trailing newline.
    pub fn build(&self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}
