use crate::presentation::views::StateView;
use crate::types::OutputFormat;
use anyhow::Result;
use teaklog_engine::RunHistory;

pub fn handle(history: &RunHistory, format: OutputFormat) -> Result<()> {
    let view = StateView::from_history(history);
    match format {
        OutputFormat::Plain => println!("{}", view.to_plain()),
        OutputFormat::Json => println!("{}", serde_json::to_string(&view)?),
    }
    Ok(())
}
