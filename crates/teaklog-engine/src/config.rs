use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_REGISTRATION_ENDPOINT: &str = r"^/games/[^/]+/users\.json$";
pub const DEFAULT_DO_NOT_TRACK_KEY: &str = "do_not_track_event";

/// Keys never rendered in narrative text: identifiers and derived fields.
pub const DEFAULT_UNINTERESTING_FIELDS: [&str; 3] = ["id", "current_state", "current_session"];

/// Engine rules that vary between SDK builds.
///
/// Loaded from TOML; every field is optional and falls back to the values the
/// shipping SDK uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Regex matched against request endpoints to find user registrations
    pub registration_endpoint: String,
    /// Payload key that marks a registration as not attributable
    pub do_not_track_key: String,
    pub uninteresting_fields: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            registration_endpoint: DEFAULT_REGISTRATION_ENDPOINT.to_string(),
            do_not_track_key: DEFAULT_DO_NOT_TRACK_KEY.to_string(),
            uninteresting_fields: DEFAULT_UNINTERESTING_FIELDS
                .iter()
                .map(|field| field.to_string())
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.registration_regex()?;
        if self.do_not_track_key.is_empty() {
            return Err(Error::Config("do_not_track_key must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn registration_regex(&self) -> Result<Regex> {
        Ok(Regex::new(&self.registration_endpoint)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "do_not_track_key = \"dnt\"\n").unwrap();

        let config = EngineConfig::load_from(&path).unwrap();
        assert_eq!(config.do_not_track_key, "dnt");
        assert_eq!(config.registration_endpoint, DEFAULT_REGISTRATION_ENDPOINT);
        assert_eq!(config.uninteresting_fields.len(), 3);
    }

    #[test]
    fn default_registration_pattern() {
        let regex = EngineConfig::default().registration_regex().unwrap();
        assert!(regex.is_match("/games/1136371193060244/users.json"));
        assert!(!regex.is_match("/games/1/events.json"));
        assert!(!regex.is_match("/games/1/users.json/extra"));
    }

    #[test]
    fn invalid_regex_is_config_error() {
        let err = EngineConfig::from_toml("registration_endpoint = \"(\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn empty_marker_is_config_error() {
        let err = EngineConfig::from_toml("do_not_track_key = \"\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
