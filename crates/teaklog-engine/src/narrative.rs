//! Human-readable text for a structural diff.

use crate::snapshot::{Change, Diff, KeyPath, PathSegment};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

const INDENT: &str = "  ";

/// Keys kept out of narrative text.
///
/// Matched only on aggregate objects: the snapshot root and the entries of
/// the listed nested collections (`sessions[i]`). Payloads and
/// configurations below them are SDK data and are rendered untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Exclusions {
    keys: BTreeSet<String>,
    collections: BTreeSet<String>,
}

impl Exclusions {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            collections: BTreeSet::new(),
        }
    }

    /// Treat the entries of the list under `key` as aggregates too.
    pub fn with_collection(mut self, key: impl Into<String>) -> Self {
        self.collections.insert(key.into());
        self
    }

    fn is_aggregate(&self, at: &[PathSegment]) -> bool {
        match at {
            [] => true,
            [PathSegment::Key(key), PathSegment::Index(_)] => self.collections.contains(key),
            _ => false,
        }
    }

    fn is_hidden_key(&self, at: &[PathSegment], key: &str) -> bool {
        self.keys.contains(key) && self.is_aggregate(at)
    }

    /// Whether a change at `path` runs through a hidden aggregate key.
    pub fn hides(&self, path: &KeyPath) -> bool {
        let segments = path.segments();
        segments.iter().enumerate().any(|(i, segment)| match segment {
            PathSegment::Key(key) => self.is_hidden_key(&segments[..i], key),
            PathSegment::Index(_) => false,
        })
    }

    /// Copy of `value`, located at `path`, without hidden aggregate keys.
    pub fn strip(&self, path: &KeyPath, value: &Value) -> Value {
        let mut at = path.segments().to_vec();
        self.strip_at(&mut at, value)
    }

    fn strip_at(&self, at: &mut Vec<PathSegment>, value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut kept = serde_json::Map::new();
                for (key, child) in map {
                    if self.is_hidden_key(at, key) {
                        continue;
                    }
                    at.push(PathSegment::Key(key.clone()));
                    kept.insert(key.clone(), self.strip_at(at, child));
                    at.pop();
                }
                Value::Object(kept)
            }
            Value::Array(items) => {
                let mut kept = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    at.push(PathSegment::Index(index));
                    kept.push(self.strip_at(at, item));
                    at.pop();
                }
                Value::Array(kept)
            }
            other => other.clone(),
        }
    }
}

/// Compose the narrative for one event: the headline, then one block per
/// change not hidden by `exclusions`. With nothing left after filtering,
/// only the headline is produced.
pub fn narrate(headline: &str, diff: &Diff, exclusions: &Exclusions) -> String {
    let mut out = headline.to_string();
    let visible = diff
        .changes()
        .iter()
        .filter(|change| !exclusions.hides(change.path()));
    for change in visible {
        for line in describe_change(change, exclusions).lines() {
            out.push('\n');
            out.push_str(INDENT);
            out.push_str(line);
        }
    }
    out
}

/// Text for a single change, possibly spanning several lines.
pub fn describe_change(change: &Change, exclusions: &Exclusions) -> String {
    match change {
        Change::Added { path, value } if path.is_entry() => {
            fragment('+', path, value, exclusions)
        }
        Change::Added { path, value } => assigned(path, value, exclusions),
        Change::Changed {
            path,
            from: Value::Null,
            to,
        } => assigned(path, to, exclusions),
        Change::Changed { path, from, to } if is_scalar(from) && is_scalar(to) => format!(
            "{} changed from '{}' to '{}'",
            field_name(path),
            scalar_text(from),
            scalar_text(to)
        ),
        Change::Changed { path, from, to } => format!(
            "{} changed from:\n{}\nto:\n{}",
            field_name(path),
            block(path, from, exclusions),
            block(path, to, exclusions)
        ),
        Change::Removed { path, value } if path.is_entry() => {
            fragment('-', path, value, exclusions)
        }
        Change::Removed { path, value } if is_scalar(value) => format!(
            "{} removed (was '{}')",
            field_name(path),
            scalar_text(value)
        ),
        Change::Removed { path, value } => format!(
            "{} removed:\n{}",
            field_name(path),
            block(path, value, exclusions)
        ),
    }
}

fn assigned(path: &KeyPath, value: &Value, exclusions: &Exclusions) -> String {
    if is_scalar(value) {
        format!("{} assigned '{}'", field_name(path), scalar_text(value))
    } else {
        format!("{}:\n{}", field_name(path), block(path, value, exclusions))
    }
}

/// Collection entry rendered on its own, prefixed with `+`/`-`.
fn fragment(sign: char, path: &KeyPath, value: &Value, exclusions: &Exclusions) -> String {
    let pretty = pretty(&exclusions.strip(path, value));
    let mut lines = pretty.lines();
    let mut out = format!("{} {}", sign, lines.next().unwrap_or_default());
    for line in lines {
        out.push('\n');
        out.push_str(INDENT);
        out.push_str(line);
    }
    out
}

fn block(path: &KeyPath, value: &Value, exclusions: &Exclusions) -> String {
    pretty(&exclusions.strip(path, value))
        .lines()
        .map(|line| format!("{}{}", INDENT, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn field_name(path: &KeyPath) -> String {
    if path.is_root() {
        "value".to_string()
    } else {
        path.to_string()
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
