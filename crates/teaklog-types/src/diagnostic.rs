use crate::LogCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of non-fatal problem found while reading a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "category", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The line does not belong to any known tag family.
    UnrecognizedLine,
    /// The line is tagged, but its payload shape is unknown.
    UnrecognizedEvent(LogCategory),
}

/// Non-fatal finding. Processing continues after one is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub text: String,
}

impl Diagnostic {
    pub fn unrecognized_line(line: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::UnrecognizedLine,
            text: line.into(),
        }
    }

    pub fn unrecognized_event(category: LogCategory, payload: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::UnrecognizedEvent(category),
            text: payload.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::UnrecognizedLine => write!(f, "Unrecognized log line: {}", self.text),
            DiagnosticKind::UnrecognizedEvent(category) => {
                write!(f, "Unrecognized {} event: {}", category, self.text)
            }
        }
    }
}
