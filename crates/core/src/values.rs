//! Normalised field values.
//!
//! Raw records arrive as JSON. Each field is normalised according to its [`FieldType`]:
//! `date` text becomes a [`DateValue`], `list` tag sets become the ordered active tag names,
//! and everything else passes through unchanged.

use crate::constants::DATE_FORMAT;
use crate::schema::FieldType;
use crate::tags;
use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A date parsed from `YYYY-MM-DD` text.
///
/// Malformed text never fails record construction; it is kept as [`DateValue::Invalid`] so
/// callers can show or resubmit what was received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateValue {
    Valid(NaiveDate),
    Invalid(String),
}

impl DateValue {
    pub fn parse(text: &str) -> Self {
        match NaiveDate::parse_from_str(text.trim(), DATE_FORMAT) {
            Ok(date) => DateValue::Valid(date),
            Err(err) => {
                tracing::debug!("unparseable date '{}': {}", text, err);
                DateValue::Invalid(text.to_string())
            }
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Valid(date) => Some(*date),
            DateValue::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, DateValue::Valid(_))
    }

    pub fn year(&self) -> Option<i32> {
        self.date().map(|d| d.year())
    }

    /// `YYYY-MM-DD` for valid dates, the original text otherwise.
    pub fn to_text(&self) -> String {
        match self {
            DateValue::Valid(date) => date.format(DATE_FORMAT).to_string(),
            DateValue::Invalid(raw) => raw.clone(),
        }
    }
}

impl std::fmt::Display for DateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateValue::Valid(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            DateValue::Invalid(_) => f.write_str("Invalid date"),
        }
    }
}

impl Serialize for DateValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_text())
    }
}

/// A normalised field value of an item.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Date(DateValue),
    /// Active tag names, in the order they were received.
    Tags(Vec<String>),
    /// Any value passed through unchanged.
    Value(Value),
}

impl FieldValue {
    /// Normalises a raw JSON value for a field of type `field_type`.
    pub fn normalise(field_type: &FieldType, raw: &Value) -> Self {
        match (field_type, raw) {
            (FieldType::Date, Value::String(text)) => FieldValue::Date(DateValue::parse(text)),
            (FieldType::Date, Value::Null) => FieldValue::Value(Value::Null),
            (FieldType::Date, other) => FieldValue::Date(DateValue::Invalid(other.to_string())),

            (FieldType::List, Value::Object(map)) => FieldValue::Tags(tags::active_tags(map)),
            (FieldType::List, Value::Array(items)) => FieldValue::Tags(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(tag) => Some(tag.clone()),
                        other => {
                            tracing::debug!("ignoring non-string tag {}", other);
                            None
                        }
                    })
                    .collect(),
            ),
            (FieldType::List, Value::Null) => FieldValue::Tags(Vec::new()),

            (_, other) => FieldValue::Value(other.clone()),
        }
    }

    /// Renders the value back into its raw payload form.
    pub fn to_raw(&self) -> Value {
        match self {
            FieldValue::Date(date) => Value::String(date.to_text()),
            FieldValue::Tags(active) => Value::Object(tags::to_tag_map(active)),
            FieldValue::Value(value) => value.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Value(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Value(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            FieldValue::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_tags(&self) -> Option<&[String]> {
        match self {
            FieldValue::Tags(tags) => Some(tags),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_raw().serialize(serializer)
    }
}
