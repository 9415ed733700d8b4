//! Assertions over a reconstructed run.
//!
//! Each helper checks one fact an acceptance step would check on a device and
//! returns a descriptive error instead of panicking, so step code can attach
//! its own context.

use anyhow::{Context, Result};
use serde_json::Value;
use teaklog_engine::{EventStream, RunHistory, Session};

fn current_session(history: &RunHistory) -> Result<&Session> {
    history
        .current_session()
        .context("Expected a current session, but no session was created")
}

/// Assert the SDK state machine is in `expected`.
pub fn assert_sdk_state(history: &RunHistory, expected: &str) -> Result<()> {
    let actual = history.current_state();
    if actual != expected {
        anyhow::bail!("Expected Teak state '{}', got '{}'", expected, actual);
    }
    Ok(())
}

/// Assert the SDK reached its current state from `expected`.
pub fn assert_sdk_transitioned_from(history: &RunHistory, expected: &str) -> Result<()> {
    let previous = history.previous_state();
    if previous != Some(expected) {
        anyhow::bail!(
            "Expected Teak to transition from '{}', got {:?}",
            expected,
            previous
        );
    }
    Ok(())
}

/// Assert the current session is in `expected`.
pub fn assert_session_state(history: &RunHistory, expected: &str) -> Result<()> {
    let session = current_session(history)?;
    if session.current_state() != expected {
        anyhow::bail!(
            "Expected session {} state '{}', got '{}'",
            session.id(),
            expected,
            session.current_state()
        );
    }
    Ok(())
}

/// Assert the current session reached its state from `expected`.
pub fn assert_session_transitioned_from(history: &RunHistory, expected: &str) -> Result<()> {
    let session = current_session(history)?;
    if session.previous_state() != Some(expected) {
        anyhow::bail!(
            "Expected session {} to transition from '{}', got {:?}",
            session.id(),
            expected,
            session.previous_state()
        );
    }
    Ok(())
}

/// Assert the session's attribution payload has `key` set to `expected`.
pub fn assert_attribution_has(session: &Session, key: &str, expected: &Value) -> Result<()> {
    let payload = session
        .attribution_payload()
        .with_context(|| format!("Session {} has no attribution payload", session.id()))?;
    let actual = payload
        .get(key)
        .with_context(|| format!("Attribution payload of {} lacks '{}'", session.id(), key))?;
    if actual != expected {
        anyhow::bail!(
            "Expected attribution '{}' to be {}, got {}",
            key,
            expected,
            actual
        );
    }
    Ok(())
}

/// Assert exactly `expected` non-fatal diagnostics were reported.
pub fn assert_diagnostic_count(stream: &EventStream, expected: usize) -> Result<()> {
    let actual = stream.diagnostics().len();
    if actual != expected {
        let texts: Vec<String> = stream.diagnostics().iter().map(|d| d.to_string()).collect();
        anyhow::bail!(
            "Expected {} diagnostics, got {}: {:?}",
            expected,
            actual,
            texts
        );
    }
    Ok(())
}
