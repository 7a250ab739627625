use crate::constants::fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Count of documents sharing one grouping key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringIdCount {
    pub id: String,
    pub count: u64,
}

impl StringIdCount {
    pub fn new(id: impl Into<String>, count: u64) -> Self {
        Self {
            id: id.into(),
            count,
        }
    }

    /// Decode a `{"_id": <key>, "count": <n>}` row emitted by a group-count pipeline.
    ///
    /// Non-string keys are rendered as JSON text; a missing or null key becomes
    /// the empty string.
    pub fn from_group_row(row: &Value) -> Result<Self, String> {
        let object = row
            .as_object()
            .ok_or_else(|| format!("group row is not a document: {row}"))?;

        let id = match object.get(fields::GROUP_ID) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let count = object
            .get(fields::COUNT)
            .and_then(Value::as_u64)
            .ok_or_else(|| format!("group row has no non-negative count: {row}"))?;

        Ok(Self { id, count })
    }
}
