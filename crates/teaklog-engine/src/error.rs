use std::fmt;

/// Result type for teaklog-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which registry a configuration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    App,
    Device,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKind::App => write!(f, "app"),
            ConfigKind::Device => write!(f, "device"),
        }
    }
}

/// State machine a transition was applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateScope {
    Sdk,
    Session(String),
}

impl fmt::Display for StateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateScope::Sdk => write!(f, "Teak"),
            StateScope::Session(id) => write!(f, "Session@{}", id),
        }
    }
}

/// Consistency violations. Every variant is fatal for the line being processed.
#[derive(Debug)]
pub enum Error {
    /// Payload of a recognized shape could not be decoded
    Decode(teaklog_parser::Error),

    /// An event addressed a different SDK instance than the one initialized
    InstanceRecreated {
        expected: String,
        found: String,
    },

    /// A Teak event arrived before `Teak@<id>` was seen
    NotInitialized {
        found: String,
    },

    DuplicateConfiguration {
        kind: ConfigKind,
        id: String,
    },

    UnknownConfiguration {
        kind: ConfigKind,
        id: Option<String>,
    },

    ConfigurationAlreadyAssigned {
        kind: ConfigKind,
    },

    /// Transition `from` did not match the current state
    StateMismatch {
        scope: StateScope,
        current: String,
        expected: Option<String>,
    },

    DuplicateSession {
        id: String,
    },

    UnknownSession {
        id: String,
    },

    NoCurrentSession {
        event: &'static str,
    },

    NonCurrentSession {
        event: &'static str,
        current: String,
        found: String,
    },

    DuplicateRequest {
        session: String,
        request: String,
    },

    UnknownRequest {
        session: String,
        request: String,
    },

    DuplicateReply {
        session: String,
        request: String,
    },

    /// Registration request broke the do-not-track sequencing rule
    Attribution {
        session: String,
        request: String,
        reason: String,
    },

    /// Configuration error
    Config(String),

    /// IO operation failed
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(err) => write!(f, "Decode error: {}", err),
            Error::InstanceRecreated { expected, found } => {
                write!(f, "Teak got re-created {} -> {}", expected, found)
            }
            Error::NotInitialized { found } => {
                write!(f, "Teak event for {} before Teak was initialized", found)
            }
            Error::DuplicateConfiguration { kind, id } => {
                write!(f, "Duplicate {} configuration created: {}", kind, id)
            }
            Error::UnknownConfiguration { kind, id } => match id {
                Some(id) => write!(f, "Unknown {} configuration: {}", kind, id),
                None => write!(f, "Unknown {} configuration: no reference given", kind),
            },
            Error::ConfigurationAlreadyAssigned { kind } => {
                write!(f, "{} configuration already assigned", capitalize(kind))
            }
            Error::StateMismatch {
                scope,
                current,
                expected,
            } => write!(
                f,
                "{} state transition consistency failed, current state is '{}', expected '{}'",
                scope,
                current,
                expected.as_deref().unwrap_or("null")
            ),
            Error::DuplicateSession { id } => write!(f, "Duplicate session created: {}", id),
            Error::UnknownSession { id } => write!(f, "Unknown session: {}", id),
            Error::NoCurrentSession { event } => write!(f, "{} for nil session", capitalize(event)),
            Error::NonCurrentSession {
                event,
                current,
                found,
            } => write!(
                f,
                "{} for non-current session: current is {}, got {}",
                capitalize(event),
                current,
                found
            ),
            Error::DuplicateRequest { session, request } => {
                write!(f, "Duplicate request {} in session {}", request, session)
            }
            Error::UnknownRequest { session, request } => {
                write!(f, "Reply to unknown request {} in session {}", request, session)
            }
            Error::DuplicateReply { session, request } => write!(
                f,
                "Request {} in session {} already has a reply",
                request, session
            ),
            Error::Attribution {
                session,
                request,
                reason,
            } => write!(
                f,
                "Attribution violation for request {} in session {}: {}",
                request, session, reason
            ),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

fn capitalize(text: impl fmt::Display) -> String {
    let text = text.to_string();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => text,
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<teaklog_parser::Error> for Error {
    fn from(err: teaklog_parser::Error) -> Self {
        Error::Decode(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Config(err.to_string())
    }
}
