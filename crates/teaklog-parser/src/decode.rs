use crate::classify::classify_line;
use crate::error::{Error, Result};
use crate::event::{LogEvent, RequestEvent, SessionEvent, TeakEvent};
use crate::payload::{ObjectPayload, split_payload};
use crate::schema::{
    HeartbeatRecord, InitRecord, LifecycleRecord, ReplyRecord, RequestRecord, SessionRecord,
    StateRecord,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use teaklog_types::{ClassifiedLine, Diagnostic, LogCategory, Transition};

/// Outcome of decoding one raw log line.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Event(LogEvent),
    /// Framing or blank line
    Ignored,
    /// Unknown line or unknown payload shape; reported, never fatal
    Unrecognized(Diagnostic),
}

type Decoder = fn(&ObjectPayload<'_>) -> Result<LogEvent>;

struct DecoderEntry {
    category: LogCategory,
    type_name: &'static str,
    decode: Decoder,
}

/// Every payload shape the SDK has logged across its versions.
///
/// Lookup is by `(category, simple type name)`; `State` and `IdentifyUser`
/// appear under more than one tag with different meaning.
static DECODERS: &[DecoderEntry] = &[
    DecoderEntry {
        category: LogCategory::Teak,
        type_name: "Teak",
        decode: decode_init,
    },
    DecoderEntry {
        category: LogCategory::Teak,
        type_name: "State",
        decode: decode_teak_state,
    },
    DecoderEntry {
        category: LogCategory::Teak,
        type_name: "Lifecycle",
        decode: decode_lifecycle,
    },
    DecoderEntry {
        category: LogCategory::Teak,
        type_name: "AppConfiguration",
        decode: decode_app_configuration,
    },
    DecoderEntry {
        category: LogCategory::Teak,
        type_name: "DeviceConfiguration",
        decode: decode_device_configuration,
    },
    DecoderEntry {
        category: LogCategory::Teak,
        type_name: "RemoteConfiguration",
        decode: decode_unmodeled_teak,
    },
    DecoderEntry {
        category: LogCategory::Teak,
        type_name: "IdentifyUser",
        decode: decode_unmodeled_teak,
    },
    DecoderEntry {
        category: LogCategory::Teak,
        type_name: "Notification",
        decode: decode_unmodeled_teak,
    },
    DecoderEntry {
        category: LogCategory::Session,
        type_name: "Session",
        decode: decode_session,
    },
    DecoderEntry {
        category: LogCategory::Session,
        type_name: "State",
        decode: decode_session_state,
    },
    DecoderEntry {
        category: LogCategory::Session,
        type_name: "Heartbeat",
        decode: decode_heartbeat,
    },
    DecoderEntry {
        category: LogCategory::Session,
        type_name: "IdentifyUser",
        decode: decode_unmodeled_session,
    },
    DecoderEntry {
        category: LogCategory::Request,
        type_name: "Request",
        decode: decode_request,
    },
    DecoderEntry {
        category: LogCategory::Request,
        type_name: "Reply",
        decode: decode_reply,
    },
];

/// Classify and decode one raw log line.
pub fn decode_line(line: &str) -> Result<Decoded> {
    match classify_line(line) {
        ClassifiedLine::Ignorable => Ok(Decoded::Ignored),
        ClassifiedLine::Unrecognized(text) => {
            Ok(Decoded::Unrecognized(Diagnostic::unrecognized_line(text)))
        }
        classified => match classified.as_tagged() {
            Some((category, _severity, payload)) => decode_payload(category, payload),
            None => Ok(Decoded::Ignored),
        },
    }
}

/// Decode the payload of a line already known to carry `category`.
pub fn decode_payload(category: LogCategory, payload: &str) -> Result<Decoded> {
    let Some(object) = split_payload(payload) else {
        return Ok(Decoded::Unrecognized(Diagnostic::unrecognized_event(
            category, payload,
        )));
    };

    match DECODERS
        .iter()
        .find(|entry| entry.category == category && entry.type_name == object.type_name)
    {
        Some(entry) => (entry.decode)(&object).map(Decoded::Event),
        None => Ok(Decoded::Unrecognized(Diagnostic::unrecognized_event(
            category, payload,
        ))),
    }
}

fn parse_json<T: DeserializeOwned>(object: &ObjectPayload<'_>) -> Result<T> {
    serde_json::from_str(object.json).map_err(|source| Error::Json {
        type_name: object.type_name.to_string(),
        source,
    })
}

fn epoch_seconds(field: &'static str, value: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(value, 0).ok_or(Error::Timestamp { field, value })
}

fn transition_from(record: StateRecord) -> Transition {
    Transition {
        from: record.previous_state,
        to: record.state,
    }
}

fn decode_init(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    let record: InitRecord = parse_json(object)?;
    Ok(LogEvent::Teak(TeakEvent::Init {
        id: object.object_id.to_string(),
        sdk_version: record.android,
    }))
}

fn decode_teak_state(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    let record: StateRecord = parse_json(object)?;
    Ok(LogEvent::Teak(TeakEvent::StateTransition {
        id: object.object_id.to_string(),
        transition: transition_from(record),
    }))
}

fn decode_lifecycle(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    let record: LifecycleRecord = parse_json(object)?;
    Ok(LogEvent::Teak(TeakEvent::Lifecycle {
        id: object.object_id.to_string(),
        callback: record.callback,
        fields: record.fields,
    }))
}

fn decode_app_configuration(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    let config: Map<String, Value> = parse_json(object)?;
    Ok(LogEvent::Teak(TeakEvent::AppConfigRegistered {
        id: object.object_id.to_string(),
        config,
    }))
}

fn decode_device_configuration(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    let config: Map<String, Value> = parse_json(object)?;
    Ok(LogEvent::Teak(TeakEvent::DeviceConfigRegistered {
        id: object.object_id.to_string(),
        config,
    }))
}

// Unmodeled bodies are not parsed: their JSON is not ours to validate.
fn decode_unmodeled_teak(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    Ok(LogEvent::Teak(TeakEvent::Unmodeled {
        type_name: object.type_name.to_string(),
    }))
}

fn decode_unmodeled_session(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    Ok(LogEvent::Session(SessionEvent::Unmodeled {
        type_name: object.type_name.to_string(),
    }))
}

fn decode_session(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    let record: SessionRecord = parse_json(object)?;
    Ok(LogEvent::Session(SessionEvent::SessionCreated {
        id: object.object_id.to_string(),
        start_date: epoch_seconds("startDate", record.start_date)?,
    }))
}

fn decode_session_state(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    let record: StateRecord = parse_json(object)?;
    Ok(LogEvent::Session(SessionEvent::SessionStateTransition {
        id: object.object_id.to_string(),
        transition: transition_from(record),
    }))
}

fn decode_heartbeat(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    let record: HeartbeatRecord = parse_json(object)?;
    Ok(LogEvent::Session(SessionEvent::Heartbeat {
        id: object.object_id.to_string(),
        timestamp: epoch_seconds("timestamp", record.timestamp)?,
    }))
}

fn decode_request(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    let record: RequestRecord = parse_json(object)?;
    Ok(LogEvent::Request(RequestEvent::RequestAttached {
        request_id: record
            .request_id
            .unwrap_or_else(|| object.object_id.to_string()),
        session_id: record.session,
        endpoint: record.endpoint,
        hostname: record.hostname,
        payload: record.payload,
    }))
}

fn decode_reply(object: &ObjectPayload<'_>) -> Result<LogEvent> {
    let record: ReplyRecord = parse_json(object)?;
    Ok(LogEvent::Request(RequestEvent::ReplyAttached {
        request_id: record
            .request_id
            .unwrap_or_else(|| object.object_id.to_string()),
        session_id: record.session,
        payload: record.payload,
        response_time: record.response_time,
    }))
}
