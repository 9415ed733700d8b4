use super::args::{Cli, Commands};
use super::handlers;
use crate::config::load_engine_config;
use crate::presentation::Console;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use teaklog_engine::{EngineConfig, EventStream, RunHistory};

pub fn run(cli: Cli) -> Result<()> {
    let console = Console::new(cli.log_level);
    let config = load_engine_config(cli.config.as_deref())?;
    let input = read_input(cli.input.as_deref())?;

    let (history, stream) = replay(&input, config, &console)?;
    console.summary(&history, &stream);

    match cli.command.unwrap_or(Commands::History) {
        Commands::History => handlers::history::handle(&history, cli.format),
        Commands::Events => handlers::events::handle(&stream, cli.format),
        Commands::State => handlers::state::handle(&history, cli.format),
        Commands::Attribution => handlers::attribution::handle(&history, cli.format),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Feed the log line by line, echoing diagnostics and events as they appear.
/// On a fatal error the narrative so far goes to stderr before the error
/// propagates.
fn replay(
    input: &str,
    config: EngineConfig,
    console: &Console,
) -> Result<(RunHistory, EventStream)> {
    let mut history = RunHistory::with_config(config)?;
    let mut stream = EventStream::new();
    let mut reported = 0;

    for (index, line) in input.lines().enumerate() {
        match history.process_line(line, &mut stream) {
            Ok(0) => {}
            Ok(_) => {
                if let Some(event) = stream.last() {
                    console.event(event);
                }
            }
            Err(err) => {
                console.failure(&stream);
                anyhow::bail!("{} (line {})", err, index + 1);
            }
        }

        for diagnostic in &stream.diagnostics()[reported..] {
            console.diagnostic(diagnostic);
        }
        reported = stream.diagnostics().len();
    }

    Ok((history, stream))
}
