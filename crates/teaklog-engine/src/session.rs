use crate::config::{DEFAULT_DO_NOT_TRACK_KEY, DEFAULT_REGISTRATION_ENDPOINT, EngineConfig};
use crate::error::{Error, Result, StateScope};
use crate::snapshot::Snapshot;
use crate::state::StateHistory;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use teaklog_types::Transition;

/// One request the SDK sent during a session, and its reply once logged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPair {
    pub endpoint: String,
    pub hostname: Option<String>,
    pub request: Map<String, Value>,
    pub reply: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

impl RequestPair {
    pub fn new(endpoint: impl Into<String>, request: Map<String, Value>) -> Self {
        Self {
            endpoint: endpoint.into(),
            hostname: None,
            request,
            reply: None,
            response_time: None,
        }
    }

    pub fn is_replied(&self) -> bool {
        self.reply.is_some()
    }
}

static DEFAULT_REGISTRATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_REGISTRATION_ENDPOINT).unwrap());

/// Which requests count as user registration and how opt-outs are marked.
#[derive(Debug, Clone)]
pub struct AttributionRules {
    registration: Regex,
    do_not_track_key: String,
}

impl Default for AttributionRules {
    fn default() -> Self {
        Self {
            registration: DEFAULT_REGISTRATION_REGEX.clone(),
            do_not_track_key: DEFAULT_DO_NOT_TRACK_KEY.to_string(),
        }
    }
}

impl AttributionRules {
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registration: config.registration_regex()?,
            do_not_track_key: config.do_not_track_key.clone(),
        })
    }

    pub fn is_registration(&self, endpoint: &str) -> bool {
        self.registration.is_match(endpoint)
    }

    pub fn is_marked(&self, payload: &Map<String, Value>) -> bool {
        match payload.get(&self.do_not_track_key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(_) => true,
        }
    }
}

/// A bounded engagement period with its own state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: String,
    start_date: DateTime<Utc>,
    states: StateHistory,
    heartbeats: Vec<DateTime<Utc>>,
    requests: BTreeMap<String, RequestPair>,
    attribution_payload: Option<Map<String, Value>>,
}

impl Session {
    pub fn new(id: impl Into<String>, start_date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            start_date,
            states: StateHistory::new(),
            heartbeats: Vec::new(),
            requests: BTreeMap::new(),
            attribution_payload: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn current_state(&self) -> &str {
        self.states.current()
    }

    /// The state the session most recently transitioned from.
    pub fn previous_state(&self) -> Option<&str> {
        self.states.previous()
    }

    pub fn state_transitions(&self) -> &[Transition] {
        self.states.transitions()
    }

    pub fn heartbeats(&self) -> &[DateTime<Utc>] {
        &self.heartbeats
    }

    pub fn requests(&self) -> &BTreeMap<String, RequestPair> {
        &self.requests
    }

    pub fn request(&self, request_id: &str) -> Option<&RequestPair> {
        self.requests.get(request_id)
    }

    /// Payload of the first user registration request, if one was sent.
    pub fn attribution_payload(&self) -> Option<&Map<String, Value>> {
        self.attribution_payload.as_ref()
    }

    pub fn snapshot(&self) -> Value {
        Snapshot::capture(self).value().clone()
    }

    pub(crate) fn apply_transition(&mut self, transition: Transition) -> Result<()> {
        self.states
            .apply(transition, StateScope::Session(self.id.clone()))
    }

    pub(crate) fn record_heartbeat(&mut self, timestamp: DateTime<Utc>) {
        self.heartbeats.push(timestamp);
    }

    /// Attach a request; returns whether it became the attribution payload.
    pub(crate) fn attach_request(
        &mut self,
        request_id: String,
        request: RequestPair,
        rules: &AttributionRules,
    ) -> Result<bool> {
        if self.requests.contains_key(&request_id) {
            return Err(Error::DuplicateRequest {
                session: self.id.clone(),
                request: request_id,
            });
        }

        let is_registration = rules.is_registration(&request.endpoint);
        if is_registration {
            let marked = rules.is_marked(&request.request);
            match (&self.attribution_payload, marked) {
                (None, true) => {
                    return Err(Error::Attribution {
                        session: self.id.clone(),
                        request: request_id,
                        reason: format!(
                            "first registration request carries '{}'",
                            rules.do_not_track_key
                        ),
                    });
                }
                (Some(_), false) => {
                    return Err(Error::Attribution {
                        session: self.id.clone(),
                        request: request_id,
                        reason: format!(
                            "repeated registration request lacks '{}'",
                            rules.do_not_track_key
                        ),
                    });
                }
                _ => {}
            }
        }

        let becomes_attribution = is_registration && self.attribution_payload.is_none();
        if becomes_attribution {
            self.attribution_payload = Some(request.request.clone());
        }
        self.requests.insert(request_id, request);
        Ok(becomes_attribution)
    }

    pub(crate) fn attach_reply(
        &mut self,
        request_id: &str,
        reply: Value,
        response_time: Option<f64>,
    ) -> Result<()> {
        let Some(pair) = self.requests.get_mut(request_id) else {
            return Err(Error::UnknownRequest {
                session: self.id.clone(),
                request: request_id.to_string(),
            });
        };
        if pair.is_replied() {
            return Err(Error::DuplicateReply {
                session: self.id.clone(),
                request: request_id.to_string(),
            });
        }
        pair.reply = Some(reply);
        pair.response_time = response_time;
        Ok(())
    }
}

#[derive(Serialize)]
struct SessionView<'a> {
    id: &'a str,
    start_date: &'a DateTime<Utc>,
    current_state: &'a str,
    state_transitions: &'a StateHistory,
    heartbeats: &'a [DateTime<Utc>],
    requests: &'a BTreeMap<String, RequestPair>,
    attribution_payload: &'a Option<Map<String, Value>>,
}

impl Serialize for Session {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SessionView {
            id: &self.id,
            start_date: &self.start_date,
            current_state: self.current_state(),
            state_transitions: &self.states,
            heartbeats: &self.heartbeats,
            requests: &self.requests,
            attribution_payload: &self.attribution_payload,
        }
        .serialize(serializer)
    }
}
