use crate::types::OutputFormat;
use anyhow::Result;
use teaklog_engine::EventStream;

pub fn handle(stream: &EventStream, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            if !stream.is_empty() {
                println!("{}", stream.render());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(stream)?),
    }
    Ok(())
}
