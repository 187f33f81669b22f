//! The one place where storage types meet the all-text row model.
//!
//! Every cell read from a table passes through [`Value`] and leaves as a
//! `String`. Nothing else in the crate inspects column types.

use rusqlite::types::ValueRef;
use serde::Serialize;

/// Core value types for SQLite storage classes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Text representation handed to the presentation layer. NULL reads as "".
    pub fn into_text(self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => real_to_text(f),
            Value::Text(s) => s,
            Value::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
        }
    }

    /// Like [`into_text`](Self::into_text) but keeps NULL distinguishable.
    pub fn into_nullable_text(self) -> Option<String> {
        match self {
            Value::Null => None,
            value => Some(value.into_text()),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

// Integral reals keep a trailing ".0" the way sqlite prints them.
fn real_to_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}
