//! Records and their normalized, comparable form.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// A caller-owned record: an arbitrarily nested attribute tree.
///
/// Records are never modified by the pipeline; clusters carry copies of
/// them in their original shape.
pub type Record = Value;

/// Flat attribute map: lower-cased key to scalar value, in insertion order.
pub type AttributeMap = IndexMap<String, Value>;

/// Label used when a record yields neither a name nor a title.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A record reduced to the attributes relevant for one instruction.
///
/// Borrows the originating record; lives only as long as the request.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedItem<'a> {
    /// The record's `id`, rendered as a string (empty when absent).
    pub id: String,

    /// Query-relevant attributes resolved from the flattened record.
    pub attributes: AttributeMap,

    /// Position of this item in the request, zero-based.
    #[serde(skip)]
    pub position: usize,

    /// Back-reference to the record this item was built from.
    #[serde(rename = "original_item")]
    pub record: &'a Record,
}

impl<'a> NormalizedItem<'a> {
    /// Create an item with no attributes.
    pub fn new(record: &'a Record, position: usize) -> Self {
        Self {
            id: record_id(record),
            attributes: AttributeMap::new(),
            position,
            record,
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by its (lower-case) name.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Human-readable label: name, then title, then [`UNKNOWN_LABEL`].
    pub fn label(&self) -> String {
        ["name", "title"]
            .iter()
            .filter_map(|key| self.attributes.get(*key))
            .map(scalar_to_string)
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    }

    /// Whether the item carries a name or a title.
    pub fn has_identification(&self) -> bool {
        self.attributes.contains_key("name") || self.attributes.contains_key("title")
    }

    /// The view of this item shown to the oracle at a batch-local index.
    ///
    /// Excludes the back-reference to keep prompts small.
    pub fn prompt_view(&self, local_index: usize) -> Value {
        let mut view = serde_json::Map::new();
        view.insert("index".to_string(), Value::from(local_index));
        view.insert("id".to_string(), Value::from(self.id.clone()));
        for (key, value) in &self.attributes {
            view.insert(key.clone(), value.clone());
        }
        Value::Object(view)
    }
}

/// Extract a record's identifier as a string.
pub fn record_id(record: &Record) -> String {
    match record.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Render a scalar as plain text (strings without quotes).
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
