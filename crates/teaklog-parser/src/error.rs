use std::fmt;

/// Result type for teaklog-parser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding a tagged log payload
#[derive(Debug)]
pub enum Error {
    /// Payload JSON of a recognized event shape failed to parse
    Json {
        type_name: String,
        source: serde_json::Error,
    },

    /// Epoch-seconds field is outside the representable range
    Timestamp { field: &'static str, value: i64 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Json { type_name, source } => {
                write!(f, "Malformed {} payload: {}", type_name, source)
            }
            Error::Timestamp { field, value } => {
                write!(f, "Invalid epoch seconds for '{}': {}", field, value)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json { source, .. } => Some(source),
            Error::Timestamp { .. } => None,
        }
    }
}
