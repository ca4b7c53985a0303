//! Purpose: Typed column-value model and JSON normalization rules.
//! Exports: `ColumnValue`, `blob_to_display`.
//! Role: The only place raw SQLite values become JSON-serializable ones.
//! Invariants: Text, integer, real, and null pass through unchanged.
//! Invariants: Blob conversion is lossy display text, not a reversible
//! encoding; the output is always valid UTF-8.

use rusqlite::types::ValueRef;
use serde_json::{Number, Value};

/// One column slot of a scanned row, tagged with its SQLite storage class.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl ColumnValue {
    pub fn to_json(&self) -> Value {
        match self {
            ColumnValue::Null => Value::Null,
            ColumnValue::Integer(value) => Value::Number((*value).into()),
            // SQLite stores NaN as NULL, but an infinity can still arrive
            // here; JSON has no representation for either.
            ColumnValue::Real(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ColumnValue::Text(value) => Value::String(value.clone()),
            ColumnValue::Blob(bytes) => Value::String(blob_to_display(bytes)),
        }
    }
}

impl From<ValueRef<'_>> for ColumnValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => ColumnValue::Null,
            ValueRef::Integer(value) => ColumnValue::Integer(value),
            ValueRef::Real(value) => ColumnValue::Real(value),
            ValueRef::Text(bytes) => {
                ColumnValue::Text(String::from_utf8_lossy(bytes).into_owned())
            }
            ValueRef::Blob(bytes) => ColumnValue::Blob(bytes.to_vec()),
        }
    }
}

/// Render a blob as display text: printable ASCII verbatim, everything
/// else as backslash escapes (`\xNN`, `\n`, ...). Lossy by design; a
/// consumer that needs the original bytes back needs a real encoding
/// such as base64 instead.
pub fn blob_to_display(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}
