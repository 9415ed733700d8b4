// Engine layer - applies decoded Teak events to the run model.
// Every event is validated before it mutates anything, then narrated as a
// snapshot diff onto the event stream.

pub mod config;
pub mod error;
pub mod history;
pub mod narrative;
pub mod process;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod stream;

pub use config::EngineConfig;
pub use error::{ConfigKind, Error, Result, StateScope};
pub use history::RunHistory;
pub use narrative::{Exclusions, narrate};
pub use session::{AttributionRules, RequestPair, Session};
pub use snapshot::{Change, Diff, KeyPath, Snapshot};
pub use state::StateHistory;
pub use stream::{EventStream, NarratedEvent};

pub use teaklog_parser::{Decoded, LogEvent};
pub use teaklog_types::{Diagnostic, DiagnosticKind, LogCategory, Transition};
