use crate::types::{LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "teaklog")]
#[command(about = "Reconstruct Teak SDK state from device logs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Logcat capture to read; stdin when omitted or `-`
    #[arg(long, short, global = true)]
    pub input: Option<PathBuf>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Engine rules file (defaults to $TEAKLOG_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Commands {
    #[command(about = "Print the full reconstructed run history (default)")]
    History,

    #[command(about = "Print the narrative of every applied event")]
    Events,

    #[command(about = "Print SDK and current session state")]
    State,

    #[command(about = "Print the attribution payload of the current session")]
    Attribution,
}
