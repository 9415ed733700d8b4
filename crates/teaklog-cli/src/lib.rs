// teaklog CLI
//
// Reads logcat text (a file or stdin), replays it through the engine and
// prints one view of the result on stdout. Everything else (diagnostics,
// narrative, failure context) goes to stderr so stdout stays parseable.

mod args;
mod commands;
pub mod config;
mod handlers;
pub mod presentation;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;
