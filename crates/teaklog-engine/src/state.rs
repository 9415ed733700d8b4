use crate::error::{Error, Result, StateScope};
use serde::Serialize;
use teaklog_types::Transition;

/// Append-only `(from, to)` history of one state machine.
///
/// Starts at `(null, "Allocated")`. A transition is accepted only when its
/// `from` equals the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StateHistory {
    transitions: Vec<Transition>,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self {
            transitions: vec![Transition::initial()],
        }
    }
}

impl StateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &str {
        // Never empty: constructed with the initial transition and only appended to.
        self.transitions
            .last()
            .map(|t| t.to.as_str())
            .unwrap_or(teaklog_types::INITIAL_STATE)
    }

    /// `from` side of the most recent transition (`None` while still Allocated).
    pub fn previous(&self) -> Option<&str> {
        self.transitions.last().and_then(|t| t.from.as_deref())
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn check(&self, transition: &Transition, scope: StateScope) -> Result<()> {
        if transition.from.as_deref() == Some(self.current()) {
            Ok(())
        } else {
            Err(Error::StateMismatch {
                scope,
                current: self.current().to_string(),
                expected: transition.from.clone(),
            })
        }
    }

    /// Validate then append; on error nothing is recorded.
    pub fn apply(&mut self, transition: Transition, scope: StateScope) -> Result<()> {
        self.check(&transition, scope)?;
        self.transitions.push(transition);
        Ok(())
    }
}
