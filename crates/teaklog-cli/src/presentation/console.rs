use crate::types::LogLevel;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use teaklog_engine::{Diagnostic, EventStream, NarratedEvent, RunHistory};

/// Stderr reporter. Filters by `LogLevel` and colors only when stderr is a
/// terminal.
pub struct Console {
    level: LogLevel,
    color: bool,
}

impl Console {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            color: std::io::stderr().is_terminal(),
        }
    }

    #[cfg(test)]
    fn plain(level: LogLevel) -> Self {
        Self {
            level,
            color: false,
        }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    pub fn diagnostic(&self, diagnostic: &Diagnostic) {
        if self.enabled(LogLevel::Warn) {
            eprintln!("{}", self.warning_line(diagnostic));
        }
    }

    pub fn event(&self, event: &NarratedEvent) {
        if self.enabled(LogLevel::Debug) {
            eprintln!("{}", event.render());
        }
    }

    pub fn summary(&self, history: &RunHistory, stream: &EventStream) {
        if self.enabled(LogLevel::Info) {
            eprintln!("{}", self.summary_line(history, stream));
        }
    }

    /// Narrative accumulated before a fatal error, printed regardless of level.
    pub fn failure(&self, stream: &EventStream) {
        if stream.is_empty() {
            return;
        }
        if self.color {
            eprintln!("{}", "Events before failure:".red().bold());
        } else {
            eprintln!("Events before failure:");
        }
        eprintln!("{}", stream.render());
    }

    fn warning_line(&self, diagnostic: &Diagnostic) -> String {
        if self.color {
            format!("{} {}", "warning:".yellow().bold(), diagnostic)
        } else {
            format!("warning: {}", diagnostic)
        }
    }

    fn summary_line(&self, history: &RunHistory, stream: &EventStream) -> String {
        let line = format!(
            "Replayed {} events ({} diagnostics), {} sessions, Teak state {}",
            stream.len(),
            stream.diagnostics().len(),
            history.sessions().len(),
            history.current_state()
        );
        if self.color {
            line.dimmed().to_string()
        } else {
            line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teaklog_testing::LogBuilder;

    #[test]
    fn level_filtering() {
        let console = Console::plain(LogLevel::Warn);
        assert!(console.enabled(LogLevel::Error));
        assert!(console.enabled(LogLevel::Warn));
        assert!(!console.enabled(LogLevel::Info));
    }

    #[test]
    fn plain_lines_have_no_escape_codes() {
        let console = Console::plain(LogLevel::Trace);
        let warning = console.warning_line(&Diagnostic::unrecognized_line("junk"));
        assert_eq!(warning, "warning: Unrecognized log line: junk");

        let log = LogBuilder::new()
            .init("1a2b", "2.1.0")
            .session_created("ff01", 1_500_000_000)
            .build();
        let (history, stream) = RunHistory::from_log(&log).unwrap();
        assert_eq!(
            console.summary_line(&history, &stream),
            "Replayed 2 events (0 diagnostics), 1 sessions, Teak state Allocated"
        );
    }
}
