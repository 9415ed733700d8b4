use crate::narrative::{Exclusions, narrate};
use crate::snapshot::Diff;
use serde::Serialize;
use std::fmt;
use teaklog_types::{Diagnostic, LogCategory};

/// One applied event together with the state change it caused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarratedEvent {
    pub component: LogCategory,
    pub action: &'static str,
    pub description: String,
    pub diff: Diff,
    /// Keys left out of the rendered narrative
    pub excluded: Exclusions,
}

impl NarratedEvent {
    pub fn headline(&self) -> String {
        format!("[{}] {}", self.component, self.description)
    }

    pub fn render(&self) -> String {
        narrate(&self.headline(), &self.diff, &self.excluded)
    }
}

impl fmt::Display for NarratedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Append-only record of a run: narrated events plus non-fatal diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventStream {
    events: Vec<NarratedEvent>,
    diagnostics: Vec<Diagnostic>,
}

impl EventStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[NarratedEvent] {
        &self.events
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&NarratedEvent> {
        self.events.last()
    }

    /// Every event rendered, one narrative block per event.
    pub fn render(&self) -> String {
        self.events
            .iter()
            .map(NarratedEvent::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn push(&mut self, event: NarratedEvent) {
        self.events.push(event);
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl fmt::Display for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use serde_json::json;

    fn event(description: &str, before: serde_json::Value, after: serde_json::Value) -> NarratedEvent {
        NarratedEvent {
            component: LogCategory::Teak,
            action: "state_transition",
            description: description.to_string(),
            diff: Snapshot::from_value(before).diff(&Snapshot::from_value(after)),
            excluded: Exclusions::new(["current_state"]),
        }
    }

    #[test]
    fn render_joins_events() {
        let mut stream = EventStream::new();
        stream.push(event(
            "State transition Allocated -> Created",
            json!({"current_state": "Allocated", "state_transitions": [[null, "Allocated"]]}),
            json!({"current_state": "Created", "state_transitions": [[null, "Allocated"], ["Allocated", "Created"]]}),
        ));
        stream.push(event("Nothing", json!({}), json!({})));

        assert_eq!(
            stream.render(),
            "[Teak] State transition Allocated -> Created\n  + [\n      \"Allocated\",\n      \"Created\"\n    ]\n[Teak] Nothing"
        );
        assert_eq!(stream.to_string(), stream.render());
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn diagnostics_do_not_render() {
        let mut stream = EventStream::new();
        stream.report(Diagnostic::unrecognized_line("garbage"));
        assert!(stream.is_empty());
        assert_eq!(stream.diagnostics().len(), 1);
        assert_eq!(stream.render(), "");
    }
}
