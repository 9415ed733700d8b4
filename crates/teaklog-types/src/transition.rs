use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State every state machine starts in.
pub const INITIAL_STATE: &str = "Allocated";

/// One `(from, to)` step of a state machine.
///
/// Serialized as a two element array (`[null, "Allocated"]`) so snapshots
/// read like the log does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    pub from: Option<String>,
    pub to: String,
}

impl Transition {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: to.into(),
        }
    }

    /// The synthetic `(null, "Allocated")` entry every history starts with.
    pub fn initial() -> Self {
        Self {
            from: None,
            to: INITIAL_STATE.to_string(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from.as_deref().unwrap_or("null"), self.to)
    }
}

impl Serialize for Transition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.from, &self.to).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (from, to) = <(Option<String>, String)>::deserialize(deserializer)?;
        Ok(Self { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_pair() {
        let json = serde_json::to_string(&Transition::initial()).unwrap();
        assert_eq!(json, r#"[null,"Allocated"]"#);

        let json = serde_json::to_string(&Transition::new("Allocated", "Created")).unwrap();
        assert_eq!(json, r#"["Allocated","Created"]"#);
    }

    #[test]
    fn deserializes_from_pair() {
        let transition: Transition = serde_json::from_str(r#"["Created","Configured"]"#).unwrap();
        assert_eq!(transition, Transition::new("Created", "Configured"));
    }

    #[test]
    fn display_uses_arrow() {
        assert_eq!(Transition::initial().to_string(), "null -> Allocated");
    }
}
