use crate::presentation::views::json_text;
use crate::types::OutputFormat;
use anyhow::Result;
use teaklog_engine::RunHistory;

pub fn handle(history: &RunHistory, format: OutputFormat) -> Result<()> {
    let snapshot = history.snapshot();
    println!("{}", json_text(&snapshot, format == OutputFormat::Plain));
    Ok(())
}
