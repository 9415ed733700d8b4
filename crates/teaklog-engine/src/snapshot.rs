//! Structural snapshots and key-path diffs.
//!
//! Aggregates expose a plain `serde_json::Value` projection; everything here
//! works on that projection only and knows nothing about the aggregate type.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// One step into a JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a change, e.g. `sessions[1].heartbeats[0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the last step is a list index (an entry of a collection).
    pub fn is_entry(&self) -> bool {
        matches!(self.0.last(), Some(PathSegment::Index(_)))
    }

    fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// A single structural difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change {
    Added { path: KeyPath, value: Value },
    Removed { path: KeyPath, value: Value },
    Changed { path: KeyPath, from: Value, to: Value },
}

impl Change {
    pub fn path(&self) -> &KeyPath {
        match self {
            Change::Added { path, .. } | Change::Removed { path, .. } | Change::Changed { path, .. } => {
                path
            }
        }
    }
}

/// Ordered list of changes, in document order of the newer snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diff {
    changes: Vec<Change>,
}

impl Diff {
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Immutable structural copy of an aggregate, taken right before a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Value);

impl Snapshot {
    pub fn capture<T: Serialize>(aggregate: &T) -> Self {
        Self(serde_json::to_value(aggregate).unwrap_or(Value::Null))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consume this snapshot and diff it against the newer one.
    pub fn diff(self, after: &Snapshot) -> Diff {
        diff_values(&self.0, &after.0)
    }
}

/// Deep key-path diff of two JSON values.
pub fn diff_values(before: &Value, after: &Value) -> Diff {
    let mut changes = Vec::new();
    walk(&KeyPath::root(), before, after, &mut changes);
    Diff { changes }
}

fn walk(path: &KeyPath, before: &Value, after: &Value, changes: &mut Vec<Change>) {
    match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            for (key, new_value) in new {
                match old.get(key) {
                    Some(old_value) => walk(&path.key(key), old_value, new_value, changes),
                    None => changes.push(Change::Added {
                        path: path.key(key),
                        value: new_value.clone(),
                    }),
                }
            }
            for (key, old_value) in old {
                if !new.contains_key(key) {
                    changes.push(Change::Removed {
                        path: path.key(key),
                        value: old_value.clone(),
                    });
                }
            }
        }
        (Value::Array(old), Value::Array(new)) => {
            for (index, new_value) in new.iter().enumerate() {
                match old.get(index) {
                    Some(old_value) => walk(&path.index(index), old_value, new_value, changes),
                    None => changes.push(Change::Added {
                        path: path.index(index),
                        value: new_value.clone(),
                    }),
                }
            }
            for (index, old_value) in old.iter().enumerate().skip(new.len()) {
                changes.push(Change::Removed {
                    path: path.index(index),
                    value: old_value.clone(),
                });
            }
        }
        _ if before == after => {}
        _ => changes.push(Change::Changed {
            path: path.clone(),
            from: before.clone(),
            to: after.clone(),
        }),
    }
}
