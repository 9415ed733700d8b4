// Parser layer - turns raw logcat text into typed Teak events.
// classify → split payload → table dispatch to a pure decoder per shape.

pub mod classify;
pub mod decode;
pub mod error;
pub mod event;
pub mod payload;
pub mod schema;

pub use classify::classify_line;
pub use decode::{Decoded, decode_line, decode_payload};
pub use error::{Error, Result};
pub use event::{LogEvent, RequestEvent, SessionEvent, TeakEvent};
pub use payload::{ObjectPayload, split_payload};
