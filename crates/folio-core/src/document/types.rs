//! Document and field patch types.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};
use crate::types::RecordId;

/// The field map of a stored document.
pub type Fields = Map<String, Value>;

/// A document as returned by a [`DocumentStore`](crate::DocumentStore).
///
/// Apart from the configured partition, order and timestamp fields, the
/// content is opaque to folio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier.
    pub id: RecordId,

    /// All stored fields.
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    /// Create a document from an id and its fields.
    pub fn new(id: RecordId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Get a raw field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a string field.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Get an integral numeric field.
    ///
    /// Accepts JSON integers and floats without a fractional part, since
    /// documents written by JavaScript clients store every number as a
    /// double. Anything else reads as absent.
    pub fn int_field(&self, key: &str) -> Option<i64> {
        let value = self.fields.get(key)?;
        if let Some(n) = value.as_i64() {
            return Some(n);
        }
        let f = value.as_f64()?;
        if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            Some(f as i64)
        } else {
            None
        }
    }

    /// Get a timestamp field.
    ///
    /// Accepts RFC 3339 strings and integer milliseconds since the epoch.
    pub fn timestamp_field(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.fields.get(key)? {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            _ => None,
        }
    }

    /// Apply a patch to this document in place.
    pub fn apply(&mut self, patch: &FieldPatch) {
        patch.apply_to(&mut self.fields);
    }
}

/// A partial update to a document's fields.
///
/// Keys present in the patch overwrite the stored value; a `null` value
/// removes the key from the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPatch(Fields);

impl FieldPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a patch from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(InvalidInputError::Other {
                message: format!("field patch must be a JSON object, got {}", kind(&other)),
            }
            .into()),
        }
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Mark a field for removal.
    pub fn unset(&mut self, key: impl Into<String>) {
        self.0.insert(key.into(), Value::Null);
    }

    /// Get a patched value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true if the patch touches `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove a key from the patch itself, returning its value.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of touched keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the patched keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Fields {
        &self.0
    }

    /// Consume and return the underlying map.
    pub fn into_map(self) -> Fields {
        self.0
    }

    /// Merge another patch into this one; keys in `other` win.
    pub fn merge(&mut self, other: FieldPatch) {
        self.0.extend(other.0);
    }

    /// Apply this patch to a field map.
    pub fn apply_to(&self, fields: &mut Fields) {
        for (key, value) in &self.0 {
            if value.is_null() {
                fields.remove(key);
            } else {
                fields.insert(key.clone(), value.clone());
            }
        }
    }

    /// Build the field map of a new document from this patch, dropping
    /// `null` entries.
    pub fn into_fields(self) -> Fields {
        self.0.into_iter().filter(|(_, v)| !v.is_null()).collect()
    }
}

impl From<Fields> for FieldPatch {
    fn from(map: Fields) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for FieldPatch {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
