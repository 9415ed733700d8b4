use crate::presentation::views::{json_text, object_value};
use crate::types::OutputFormat;
use anyhow::{Context, Result};
use teaklog_engine::RunHistory;

pub fn handle(history: &RunHistory, format: OutputFormat) -> Result<()> {
    let session = history
        .current_session()
        .context("No session was created in this log")?;
    let payload = session
        .attribution_payload()
        .with_context(|| format!("No attribution payload in session {}", session.id()))?;

    println!(
        "{}",
        json_text(&object_value(payload), format == OutputFormat::Plain)
    );
    Ok(())
}
