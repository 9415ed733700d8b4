use regex::Regex;
use std::sync::LazyLock;
use teaklog_types::{ClassifiedLine, LogCategory, Severity};

/// Severity marker, Teak tag, optional brief-format pid, then the payload.
///
/// Matches both logcat layouts:
/// `05-16 10:12:01.123  4242  4242 D Teak    : payload` (threadtime)
/// `D/Teak.Session( 4242): payload` (brief)
static TAGGED_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\s)([A-Z])[ /](Teak(?:\.Session|\.Request)?)\s*(?:\(\s*\d+\s*\))?\s*: (.*)$",
    )
    .unwrap()
});

/// Tag one raw log line by category and severity.
///
/// Never fails: lines that do not carry a Teak tag (or carry an unknown
/// severity letter) come back as `Unrecognized` so the caller can report them.
pub fn classify_line(line: &str) -> ClassifiedLine {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim().is_empty() || line.starts_with('-') {
        return ClassifiedLine::Ignorable;
    }

    let Some(caps) = TAGGED_LINE_REGEX.captures(line) else {
        return ClassifiedLine::Unrecognized(line.to_string());
    };

    let severity = caps[1].chars().next().and_then(Severity::from_marker);
    let category = LogCategory::from_tag(&caps[2]);

    match (severity, category) {
        (Some(severity), Some(category)) => {
            ClassifiedLine::tagged(category, severity, caps[3].trim_end())
        }
        _ => ClassifiedLine::Unrecognized(line.to_string()),
    }
}
