use serde::{Deserialize, Serialize};
use std::fmt;

/// Logcat priority marker (the single letter before the tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Assert,
    Fatal,
}

impl Severity {
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'V' => Some(Severity::Verbose),
            'D' => Some(Severity::Debug),
            'I' => Some(Severity::Info),
            'W' => Some(Severity::Warn),
            'E' => Some(Severity::Error),
            'A' => Some(Severity::Assert),
            'F' => Some(Severity::Fatal),
            _ => None,
        }
    }

    pub fn marker(&self) -> char {
        match self {
            Severity::Verbose => 'V',
            Severity::Debug => 'D',
            Severity::Info => 'I',
            Severity::Warn => 'W',
            Severity::Error => 'E',
            Severity::Assert => 'A',
            Severity::Fatal => 'F',
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// Log tag family a line belongs to.
///
/// Doubles as the component tag of narrated events: Teak events mutate the
/// run history, Session and Request events mutate a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    Teak,
    Session,
    Request,
}

impl LogCategory {
    pub const ALL: [LogCategory; 3] = [LogCategory::Teak, LogCategory::Session, LogCategory::Request];

    /// Logcat tag as written by the SDK.
    pub fn tag(&self) -> &'static str {
        match self {
            LogCategory::Teak => "Teak",
            LogCategory::Session => "Teak.Session",
            LogCategory::Request => "Teak.Request",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.tag() == tag)
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Result of classifying one raw log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedLine {
    TeakEvent(Severity, String),
    SessionEvent(Severity, String),
    RequestEvent(Severity, String),
    /// Blank lines and logcat framing (`--------- beginning of main`)
    Ignorable,
    Unrecognized(String),
}

impl ClassifiedLine {
    pub fn tagged(category: LogCategory, severity: Severity, payload: impl Into<String>) -> Self {
        let payload = payload.into();
        match category {
            LogCategory::Teak => ClassifiedLine::TeakEvent(severity, payload),
            LogCategory::Session => ClassifiedLine::SessionEvent(severity, payload),
            LogCategory::Request => ClassifiedLine::RequestEvent(severity, payload),
        }
    }

    /// Category, severity and payload of a tagged line.
    pub fn as_tagged(&self) -> Option<(LogCategory, Severity, &str)> {
        match self {
            ClassifiedLine::TeakEvent(severity, payload) => {
                Some((LogCategory::Teak, *severity, payload))
            }
            ClassifiedLine::SessionEvent(severity, payload) => {
                Some((LogCategory::Session, *severity, payload))
            }
            ClassifiedLine::RequestEvent(severity, payload) => {
                Some((LogCategory::Request, *severity, payload))
            }
            ClassifiedLine::Ignorable | ClassifiedLine::Unrecognized(_) => None,
        }
    }
}
