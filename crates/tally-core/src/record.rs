//! Named-field access over heterogeneous records.
//!
//! The analytics algorithms never know the concrete record type; they ask
//! for a field by name and work with the returned [`FieldValue`].

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A borrowed view of one field of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// The field exists but holds no value.
    Null,
    /// Numeric value.
    Number(Decimal),
    /// Text value.
    Text(&'a str),
    /// Calendar date.
    Date(NaiveDate),
}

impl FieldValue<'_> {
    /// Numeric payload, if any.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the value counts as empty (null, empty text, zero).
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Number(n) => n.is_zero(),
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Date(_) => false,
        }
    }
}

/// Values of the same kind compare naturally; values of different kinds are
/// unordered.
impl PartialOrd for FieldValue<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Some(Ordering::Equal),
            (FieldValue::Number(a), FieldValue::Number(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Anything whose fields can be looked up by name.
pub trait Record {
    /// Returns `None` when the record has no such field.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        (**self).field(name)
    }
}

/// Owned counterpart of [`FieldValue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(Decimal),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    pub fn as_field(&self) -> FieldValue<'_> {
        match self {
            Value::Null => FieldValue::Null,
            Value::Number(n) => FieldValue::Number(*n),
            Value::Text(s) => FieldValue::Text(s),
            Value::Date(d) => FieldValue::Date(*d),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

/// A free-form record: an ordered map of field names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(IndexMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

impl Record for Row {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.0.get(name).map(Value::as_field)
    }
}
