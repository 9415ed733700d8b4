use crate::config::EngineConfig;
use crate::error::{ConfigKind, Error, Result, StateScope};
use crate::narrative::Exclusions;
use crate::session::{AttributionRules, RequestPair, Session};
use crate::snapshot::Snapshot;
use crate::state::StateHistory;
use chrono::SecondsFormat;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use teaklog_parser::{RequestEvent, SessionEvent, TeakEvent};
use teaklog_types::Transition;

const ACTIVITY_CREATED: &str = "onActivityCreated";

type JsonObject = Map<String, Value>;

/// What an applied event did, before its diff is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Applied {
    pub action: &'static str,
    pub description: String,
}

impl Applied {
    fn new(action: &'static str, description: String) -> Self {
        Self {
            action,
            description,
        }
    }
}

/// Everything reconstructed about one SDK run from its log.
///
/// Mutated only through the event appliers, which validate every invariant
/// before touching state. A rejected event leaves the history exactly as it
/// was.
#[derive(Debug, Clone)]
pub struct RunHistory {
    id: Option<String>,
    sdk_version: Option<String>,
    app_configuration: Option<JsonObject>,
    device_configuration: Option<JsonObject>,
    app_configurations: BTreeMap<String, JsonObject>,
    device_configurations: BTreeMap<String, JsonObject>,
    states: StateHistory,
    lifecycle_events: Vec<JsonObject>,
    sessions: Vec<Session>,
    config: EngineConfig,
    rules: AttributionRules,
    exclusions: Exclusions,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::build(EngineConfig::default(), AttributionRules::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        let rules = AttributionRules::from_config(&config)?;
        Ok(Self::build(config, rules))
    }

    fn build(config: EngineConfig, rules: AttributionRules) -> Self {
        Self {
            id: None,
            sdk_version: None,
            app_configuration: None,
            device_configuration: None,
            app_configurations: BTreeMap::new(),
            device_configurations: BTreeMap::new(),
            states: StateHistory::new(),
            lifecycle_events: Vec::new(),
            sessions: Vec::new(),
            exclusions: Exclusions::new(config.uninteresting_fields.iter().cloned())
                .with_collection("sessions"),
            config,
            rules,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Keys hidden from the narrative of events applied to this history.
    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn sdk_version(&self) -> Option<&str> {
        self.sdk_version.as_deref()
    }

    pub fn current_state(&self) -> &str {
        self.states.current()
    }

    pub fn previous_state(&self) -> Option<&str> {
        self.states.previous()
    }

    pub fn state_transitions(&self) -> &[Transition] {
        self.states.transitions()
    }

    pub fn app_configuration(&self) -> Option<&JsonObject> {
        self.app_configuration.as_ref()
    }

    pub fn device_configuration(&self) -> Option<&JsonObject> {
        self.device_configuration.as_ref()
    }

    pub fn lifecycle_events(&self) -> &[JsonObject] {
        &self.lifecycle_events
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Most recently created session.
    pub fn current_session(&self) -> Option<&Session> {
        self.sessions.last()
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|session| session.id() == id)
    }

    pub fn snapshot(&self) -> Value {
        Snapshot::capture(self).value().clone()
    }

    fn session_mut(&mut self, id: &str) -> Result<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|session| session.id() == id)
            .ok_or_else(|| Error::UnknownSession { id: id.to_string() })
    }

    /// Configuration registrations carry no instance id; only the order is checked.
    fn check_initialized(&self, found: &str) -> Result<()> {
        match self.id {
            None => Err(Error::NotInitialized {
                found: found.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn check_instance(&self, found: &str) -> Result<()> {
        match &self.id {
            None => Err(Error::NotInitialized {
                found: found.to_string(),
            }),
            Some(expected) if expected != found => Err(Error::InstanceRecreated {
                expected: expected.clone(),
                found: found.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    pub(crate) fn apply_teak(&mut self, event: TeakEvent) -> Result<Option<Applied>> {
        match event {
            TeakEvent::Init { id, sdk_version } => {
                if let Some(expected) = &self.id {
                    return Err(Error::InstanceRecreated {
                        expected: expected.clone(),
                        found: id,
                    });
                }
                let description = match &sdk_version {
                    Some(version) => format!("Teak@{} initialized (SDK {})", id, version),
                    None => format!("Teak@{} initialized", id),
                };
                self.id = Some(id);
                self.sdk_version = sdk_version;
                Ok(Some(Applied::new("init", description)))
            }
            TeakEvent::StateTransition { id, transition } => {
                self.check_instance(&id)?;
                let description = format!("State transition {}", transition);
                self.states.apply(transition, StateScope::Sdk)?;
                Ok(Some(Applied::new("state_transition", description)))
            }
            TeakEvent::Lifecycle {
                id,
                callback,
                fields,
            } => {
                self.check_instance(&id)?;
                let description = format!("Lifecycle {}", callback);
                let is_activity_created = callback == ACTIVITY_CREATED;
                let mut record = JsonObject::new();
                record.insert("callback".to_string(), Value::String(callback));
                if is_activity_created {
                    let device = self.resolve_configuration(ConfigKind::Device, &fields)?;
                    let app = self.resolve_configuration(ConfigKind::App, &fields)?;
                    self.device_configuration = Some(device);
                    self.app_configuration = Some(app);
                } else {
                    record.extend(fields);
                }
                self.lifecycle_events.push(record);
                Ok(Some(Applied::new("lifecycle", description)))
            }
            TeakEvent::AppConfigRegistered { id, config } => {
                self.check_initialized(&id)?;
                self.register_configuration(ConfigKind::App, id, config)
                    .map(Some)
            }
            TeakEvent::DeviceConfigRegistered { id, config } => {
                self.check_initialized(&id)?;
                self.register_configuration(ConfigKind::Device, id, config)
                    .map(Some)
            }
            TeakEvent::Unmodeled { .. } => Ok(None),
        }
    }

    fn registry(&self, kind: ConfigKind) -> &BTreeMap<String, JsonObject> {
        match kind {
            ConfigKind::App => &self.app_configurations,
            ConfigKind::Device => &self.device_configurations,
        }
    }

    fn register_configuration(
        &mut self,
        kind: ConfigKind,
        id: String,
        config: JsonObject,
    ) -> Result<Applied> {
        if self.registry(kind).contains_key(&id) {
            return Err(Error::DuplicateConfiguration { kind, id });
        }
        let (action, label) = match kind {
            ConfigKind::App => ("app_configuration", "App"),
            ConfigKind::Device => ("device_configuration", "Device"),
        };
        let description = format!("{} configuration {} registered", label, id);
        match kind {
            ConfigKind::App => self.app_configurations.insert(id, config),
            ConfigKind::Device => self.device_configurations.insert(id, config),
        };
        Ok(Applied::new(action, description))
    }

    /// Look up the configuration an `onActivityCreated` body points at.
    fn resolve_configuration(&self, kind: ConfigKind, fields: &JsonObject) -> Result<JsonObject> {
        let (field, assigned) = match kind {
            ConfigKind::App => ("appConfiguration", &self.app_configuration),
            ConfigKind::Device => ("deviceConfiguration", &self.device_configuration),
        };
        let reference = fields.get(field).and_then(Value::as_str);
        let config = reference
            .and_then(|id| self.registry(kind).get(id))
            .ok_or_else(|| Error::UnknownConfiguration {
                kind,
                id: reference.map(String::from),
            })?;
        if assigned.is_some() {
            return Err(Error::ConfigurationAlreadyAssigned { kind });
        }
        Ok(config.clone())
    }

    pub(crate) fn apply_session(&mut self, event: SessionEvent) -> Result<Option<Applied>> {
        match event {
            SessionEvent::SessionCreated { id, start_date } => {
                if self.current_session().is_some_and(|current| current.id() == id) {
                    return Ok(None);
                }
                if self.session(&id).is_some() {
                    return Err(Error::DuplicateSession { id });
                }
                let description = format!("Session {} created", id);
                self.sessions.push(Session::new(id, start_date));
                Ok(Some(Applied::new("session_created", description)))
            }
            SessionEvent::SessionStateTransition { id, transition } => {
                let description = format!("Session {} state transition {}", id, transition);
                self.session_mut(&id)?.apply_transition(transition)?;
                Ok(Some(Applied::new("state_transition", description)))
            }
            SessionEvent::Heartbeat { id, timestamp } => {
                let current = self
                    .sessions
                    .last_mut()
                    .ok_or(Error::NoCurrentSession { event: "heartbeat" })?;
                if current.id() != id {
                    return Err(Error::NonCurrentSession {
                        event: "heartbeat",
                        current: current.id().to_string(),
                        found: id,
                    });
                }
                current.record_heartbeat(timestamp);
                let description = format!(
                    "Session {} heartbeat at {}",
                    id,
                    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
                );
                Ok(Some(Applied::new("heartbeat", description)))
            }
            SessionEvent::Unmodeled { .. } => Ok(None),
        }
    }

    pub(crate) fn apply_request(&mut self, event: RequestEvent) -> Result<Option<Applied>> {
        match event {
            RequestEvent::RequestAttached {
                request_id,
                session_id,
                endpoint,
                hostname,
                payload,
            } => {
                let session = self
                    .sessions
                    .iter_mut()
                    .find(|session| session.id() == session_id)
                    .ok_or_else(|| Error::UnknownSession {
                        id: session_id.clone(),
                    })?;
                let mut description =
                    format!("Request {} to {} (session {})", request_id, endpoint, session_id);
                let request = RequestPair {
                    hostname,
                    ..RequestPair::new(endpoint, payload)
                };
                if session.attach_request(request_id, request, &self.rules)? {
                    description.push_str(" recorded as attribution");
                }
                Ok(Some(Applied::new("request", description)))
            }
            RequestEvent::ReplyAttached {
                request_id,
                session_id,
                payload,
                response_time,
            } => {
                let description =
                    format!("Reply to request {} (session {})", request_id, session_id);
                self.session_mut(&session_id)?
                    .attach_reply(&request_id, payload, response_time)?;
                Ok(Some(Applied::new("reply", description)))
            }
        }
    }
}

impl Default for RunHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct RunHistoryView<'a> {
    id: Option<&'a str>,
    sdk_version: Option<&'a str>,
    current_state: &'a str,
    state_transitions: &'a StateHistory,
    app_configurations: &'a BTreeMap<String, JsonObject>,
    device_configurations: &'a BTreeMap<String, JsonObject>,
    app_configuration: &'a Option<JsonObject>,
    device_configuration: &'a Option<JsonObject>,
    lifecycle_events: &'a [JsonObject],
    current_session: Option<&'a str>,
    sessions: &'a [Session],
}

impl Serialize for RunHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        RunHistoryView {
            id: self.id(),
            sdk_version: self.sdk_version(),
            current_state: self.current_state(),
            state_transitions: &self.states,
            app_configurations: &self.app_configurations,
            device_configurations: &self.device_configurations,
            app_configuration: &self.app_configuration,
            device_configuration: &self.device_configuration,
            lifecycle_events: &self.lifecycle_events,
            current_session: self.current_session().map(Session::id),
            sessions: &self.sessions,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    fn init(history: &mut RunHistory) {
        history
            .apply_teak(TeakEvent::Init {
                id: "1a2b".into(),
                sdk_version: Some("2.1.0".into()),
            })
            .unwrap();
    }

    fn lifecycle(id: &str, callback: &str, fields: Value) -> TeakEvent {
        TeakEvent::Lifecycle {
            id: id.into(),
            callback: callback.into(),
            fields: object(fields),
        }
    }

    #[test]
    fn init_records_id_and_version() {
        let mut history = RunHistory::new();
        init(&mut history);
        assert_eq!(history.id(), Some("1a2b"));
        assert_eq!(history.sdk_version(), Some("2.1.0"));
        assert_eq!(history.current_state(), "Allocated");
    }

    #[test]
    fn second_init_is_recreation() {
        let mut history = RunHistory::new();
        init(&mut history);
        let err = history
            .apply_teak(TeakEvent::Init {
                id: "9999".into(),
                sdk_version: None,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Teak got re-created 1a2b -> 9999");
        assert_eq!(history.id(), Some("1a2b"));
    }

    #[test]
    fn transition_before_init_is_rejected() {
        let mut history = RunHistory::new();
        let err = history
            .apply_teak(TeakEvent::StateTransition {
                id: "1a2b".into(),
                transition: Transition::new("Allocated", "Created"),
            })
            .unwrap_err();
        assert!(matches!(err, Error::NotInitialized { .. }));
    }

    #[test]
    fn registration_before_init_is_fatal() {
        let mut history = RunHistory::new();
        let err = history
            .apply_teak(TeakEvent::DeviceConfigRegistered {
                id: "beef".into(),
                config: JsonObject::new(),
            })
            .unwrap_err();
        assert!(matches!(err, Error::NotInitialized { ref found } if found == "beef"));
        assert!(history.registry(ConfigKind::Device).is_empty());
    }

    #[test]
    fn activity_created_resolves_both_configurations() {
        let mut history = RunHistory::new();
        init(&mut history);
        history
            .apply_teak(TeakEvent::AppConfigRegistered {
                id: "c0ffee".into(),
                config: object(json!({"appId": "1"})),
            })
            .unwrap();
        history
            .apply_teak(TeakEvent::DeviceConfigRegistered {
                id: "beef".into(),
                config: object(json!({"deviceId": "d"})),
            })
            .unwrap();
        history
            .apply_teak(lifecycle(
                "1a2b",
                ACTIVITY_CREATED,
                json!({"appConfiguration": "c0ffee", "deviceConfiguration": "beef"}),
            ))
            .unwrap();

        assert_eq!(history.app_configuration(), Some(&object(json!({"appId": "1"}))));
        assert_eq!(
            history.device_configuration(),
            Some(&object(json!({"deviceId": "d"})))
        );
        assert_eq!(
            history.lifecycle_events(),
            &[object(json!({"callback": "onActivityCreated"}))]
        );
    }

    #[test]
    fn unknown_configuration_reference_changes_nothing() {
        let mut history = RunHistory::new();
        init(&mut history);
        history
            .apply_teak(TeakEvent::DeviceConfigRegistered {
                id: "beef".into(),
                config: JsonObject::new(),
            })
            .unwrap();
        let err = history
            .apply_teak(lifecycle(
                "1a2b",
                ACTIVITY_CREATED,
                json!({"appConfiguration": "dead", "deviceConfiguration": "beef"}),
            ))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown app configuration: dead");
        assert!(history.device_configuration().is_none());
        assert!(history.lifecycle_events().is_empty());
    }

    #[test]
    fn other_callbacks_are_stored_verbatim() {
        let mut history = RunHistory::new();
        init(&mut history);
        history
            .apply_teak(lifecycle("1a2b", "onActivityResumed", json!({"intent": "x"})))
            .unwrap();
        assert_eq!(
            history.lifecycle_events(),
            &[object(json!({"callback": "onActivityResumed", "intent": "x"}))]
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut history = RunHistory::new();
        init(&mut history);
        let register = || TeakEvent::AppConfigRegistered {
            id: "c0ffee".into(),
            config: JsonObject::new(),
        };
        history.apply_teak(register()).unwrap();
        let err = history.apply_teak(register()).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate app configuration created: c0ffee");
    }

    #[test]
    fn session_creation_rules() {
        let mut history = RunHistory::new();
        let created = |id: &str| SessionEvent::SessionCreated {
            id: id.into(),
            start_date: DateTime::from_timestamp(1_500_000_000, 0).unwrap(),
        };

        assert!(history.apply_session(created("ff01")).unwrap().is_some());
        assert!(history.apply_session(created("ff01")).unwrap().is_none());
        assert!(history.apply_session(created("ff02")).unwrap().is_some());
        let err = history.apply_session(created("ff01")).unwrap_err();
        assert!(matches!(err, Error::DuplicateSession { .. }));

        assert_eq!(history.sessions().len(), 2);
        assert_eq!(history.current_session().map(Session::id), Some("ff02"));
    }

    #[test]
    fn heartbeat_requires_current_session() {
        let mut history = RunHistory::new();
        let heartbeat = |id: &str| SessionEvent::Heartbeat {
            id: id.into(),
            timestamp: DateTime::from_timestamp(1_500_000_060, 0).unwrap(),
        };
        let err = history.apply_session(heartbeat("ff01")).unwrap_err();
        assert_eq!(err.to_string(), "Heartbeat for nil session");

        for id in ["ff01", "ff02"] {
            history
                .apply_session(SessionEvent::SessionCreated {
                    id: id.into(),
                    start_date: DateTime::from_timestamp(1_500_000_000, 0).unwrap(),
                })
                .unwrap();
        }
        let err = history.apply_session(heartbeat("ff01")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Heartbeat for non-current session: current is ff02, got ff01"
        );
        assert!(history.session("ff01").unwrap().heartbeats().is_empty());
    }

    #[test]
    fn request_for_unknown_session_is_rejected() {
        let mut history = RunHistory::new();
        let err = history
            .apply_request(RequestEvent::RequestAttached {
                request_id: "r1".into(),
                session_id: "ff01".into(),
                endpoint: "/me/events".into(),
                hostname: None,
                payload: JsonObject::new(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown session: ff01");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            registration_endpoint: "([".into(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            RunHistory::with_config(config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn snapshot_names_current_session() {
        let mut history = RunHistory::new();
        init(&mut history);
        history
            .apply_session(SessionEvent::SessionCreated {
                id: "ff01".into(),
                start_date: DateTime::from_timestamp(1_500_000_000, 0).unwrap(),
            })
            .unwrap();
        let snapshot = history.snapshot();
        assert_eq!(snapshot["id"], json!("1a2b"));
        assert_eq!(snapshot["current_session"], json!("ff01"));
        assert_eq!(snapshot["sessions"][0]["current_state"], json!("Allocated"));
        assert_eq!(snapshot["app_configuration"], Value::Null);
    }
}
