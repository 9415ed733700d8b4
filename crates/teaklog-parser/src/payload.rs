use regex::Regex;
use std::sync::LazyLock;

/// `io.teak.sdk.Session@2c5e229: {...}`: optional package, simple type
/// name, hex identity hash, JSON body.
static OBJECT_PAYLOAD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z_][\w$]*\.)*([A-Za-z_][\w$]*)@([0-9a-fA-F]+): (.*)$").unwrap()
});

/// A tagged payload split into its `TypeName@<hexId>: <json>` parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectPayload<'a> {
    /// Simple type name with any package prefix removed
    pub type_name: &'a str,
    pub object_id: &'a str,
    pub json: &'a str,
}

/// Split a payload, or `None` when it is free text (e.g. `SDK Version: 2.1.0`).
pub fn split_payload(payload: &str) -> Option<ObjectPayload<'_>> {
    let caps = OBJECT_PAYLOAD_REGEX.captures(payload)?;
    Some(ObjectPayload {
        type_name: caps.get(1)?.as_str(),
        object_id: caps.get(2)?.as_str(),
        json: caps.get(3)?.as_str(),
    })
}
