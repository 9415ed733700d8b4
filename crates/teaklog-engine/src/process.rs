use crate::error::Result;
use crate::history::{Applied, RunHistory};
use crate::snapshot::Snapshot;
use crate::stream::{EventStream, NarratedEvent};
use serde_json::Value;
use teaklog_parser::{Decoded, LogEvent, RequestEvent, SessionEvent, decode_line};

/// Aggregate an event is diffed against.
enum Target {
    History,
    Session(String),
}

impl RunHistory {
    /// Feed a whole log. Returns the stream extended with what the log produced.
    ///
    /// On error the lines before the failing one stay applied; use
    /// [`RunHistory::process_line`] with an owned stream to keep the partial
    /// narrative.
    pub fn process(&mut self, text: &str, stream: Option<EventStream>) -> Result<EventStream> {
        let mut stream = stream.unwrap_or_default();
        for line in text.lines() {
            self.process_line(line, &mut stream)?;
        }
        Ok(stream)
    }

    /// Build a history from a complete log.
    pub fn from_log(text: &str) -> Result<(Self, EventStream)> {
        let mut history = Self::new();
        let stream = history.process(text, None)?;
        Ok((history, stream))
    }

    /// Classify, decode and apply one line. Returns the number of narrated
    /// events it appended (zero or one).
    pub fn process_line(&mut self, line: &str, stream: &mut EventStream) -> Result<usize> {
        match decode_line(line)? {
            Decoded::Ignored => Ok(0),
            Decoded::Unrecognized(diagnostic) => {
                stream.report(diagnostic);
                Ok(0)
            }
            Decoded::Event(event) => self.apply_event(event, stream),
        }
    }

    /// Apply an already decoded event and narrate its effect.
    pub fn apply_event(&mut self, event: LogEvent, stream: &mut EventStream) -> Result<usize> {
        if event.is_unmodeled() {
            return Ok(0);
        }

        let component = event.category();
        let target = self.target_of(&event);
        let before = self.capture(&target);
        let applied = match event {
            LogEvent::Teak(event) => self.apply_teak(event)?,
            LogEvent::Session(event) => self.apply_session(event)?,
            LogEvent::Request(event) => self.apply_request(event)?,
        };
        let Some(Applied {
            action,
            description,
        }) = applied
        else {
            return Ok(0);
        };

        let diff = before.diff(&self.capture(&target));
        stream.push(NarratedEvent {
            component,
            action,
            description,
            diff,
            excluded: self.exclusions().clone(),
        });
        Ok(1)
    }

    fn target_of(&self, event: &LogEvent) -> Target {
        match event {
            LogEvent::Teak(_) | LogEvent::Session(SessionEvent::SessionCreated { .. }) => {
                Target::History
            }
            LogEvent::Session(SessionEvent::SessionStateTransition { id, .. }) => {
                Target::Session(id.clone())
            }
            LogEvent::Session(SessionEvent::Heartbeat { .. } | SessionEvent::Unmodeled { .. }) => {
                match self.current_session() {
                    Some(session) => Target::Session(session.id().to_string()),
                    None => Target::History,
                }
            }
            LogEvent::Request(event) => Target::Session(request_session(event).to_string()),
        }
    }

    fn capture(&self, target: &Target) -> Snapshot {
        match target {
            Target::History => Snapshot::capture(self),
            Target::Session(id) => match self.session(id) {
                Some(session) => Snapshot::capture(session),
                None => Snapshot::from_value(Value::Null),
            },
        }
    }
}

fn request_session(event: &RequestEvent) -> &str {
    match event {
        RequestEvent::RequestAttached { session_id, .. }
        | RequestEvent::ReplyAttached { session_id, .. } => session_id,
    }
}
