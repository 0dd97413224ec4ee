//! Schema-bound patient records.
//!
//! A [`Patient`] is built from a raw JSON record and a [`Schema`]. For every schema column it
//! holds an ordered list of [`Item`]s, one per subrecord, with field values normalised by
//! field type. Single columns hold a one-element list so consumers can always index `[0]`.
//!
//! Patients own their items exclusively and are mutated in place by the list controller when
//! an edit modal saves an item or a new item is appended.

use crate::constants::{ID_KEY, LOCATION_COLUMN, TAGS_FIELD};
use crate::schema::{Column, Schema};
use crate::values::FieldValue;
use crate::{OpalError, OpalResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// One normalised subrecord within a column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Item {
    id: Option<i64>,
    fields: BTreeMap<String, FieldValue>,
}

impl Item {
    /// Builds an item from a raw subrecord, normalising the fields `column` declares.
    ///
    /// Keys the column does not declare are ignored. A present `id` is preserved.
    ///
    /// # Errors
    ///
    /// Returns `OpalError::InvalidRecord` if `raw` is not an object or its `id` is not an
    /// integer.
    pub fn from_raw(column: &Column, raw: &Value) -> OpalResult<Self> {
        let map = raw.as_object().ok_or_else(|| {
            OpalError::InvalidRecord(format!(
                "items of column '{}' must be objects, got {}",
                column.name, raw
            ))
        })?;

        let mut item = Item::default();
        item.apply(column, map)?;
        Ok(item)
    }

    /// Merges a raw payload into this item: declared fields present in `payload` replace the
    /// current values, a present `id` replaces the identifier, everything else is untouched.
    ///
    /// The item is left unchanged when the payload's `id` is not an integer.
    pub fn apply(&mut self, column: &Column, payload: &Map<String, Value>) -> OpalResult<()> {
        if let Some(raw_id) = payload.get(ID_KEY) {
            self.id = parse_id(&column.name, raw_id)?;
        }
        for (key, value) in payload {
            if key == ID_KEY {
                continue;
            }
            match column.field(key) {
                Some(field) => {
                    self.fields
                        .insert(key.clone(), FieldValue::normalise(&field.field_type, value));
                }
                None => {
                    tracing::debug!("column '{}' has no field '{}', ignoring", column.name, key);
                }
            }
        }
        Ok(())
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.fields.is_empty()
    }

    /// Raw payload form of the item (`id` first, then fields).
    pub fn to_raw(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(id) = self.id {
            map.insert(ID_KEY.to_string(), Value::from(id));
        }
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_raw());
        }
        map
    }
}

fn parse_id(column: &str, value: &Value) -> OpalResult<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        other => other.as_i64().map(Some).ok_or_else(|| {
            OpalError::InvalidRecord(format!(
                "item id in column '{column}' must be an integer, got {other}"
            ))
        }),
    }
}

/// A patient record bound to a schema.
#[derive(Clone, Debug, PartialEq)]
pub struct Patient {
    id: i64,
    columns: BTreeMap<String, Vec<Item>>,
}

impl Patient {
    /// Builds a patient from a raw record: `{ id, <column>: [ {...}, ... ], ... }`.
    ///
    /// Every schema column yields a list, empty when the record lacks the key. A single
    /// column accepts either a bare object or a list; lists longer than one keep only the
    /// first item. The raw record is not modified and malformed dates do not fail.
    ///
    /// # Errors
    ///
    /// Returns `OpalError::InvalidRecord` if the record is not an object, has no integer `id`,
    /// or a column holds something other than a list or an object.
    pub fn new(raw: &Value, schema: &Schema) -> OpalResult<Self> {
        let record = raw
            .as_object()
            .ok_or_else(|| OpalError::InvalidRecord("patient record must be an object".into()))?;

        let id = record
            .get(ID_KEY)
            .and_then(Value::as_i64)
            .ok_or_else(|| OpalError::InvalidRecord("patient record needs an integer id".into()))?;

        let mut columns = BTreeMap::new();
        for column in schema {
            let items = match record.get(&column.name) {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(raw_items)) => {
                    let mut items = raw_items
                        .iter()
                        .map(|raw_item| Item::from_raw(column, raw_item))
                        .collect::<OpalResult<Vec<_>>>()?;
                    if column.single && items.len() > 1 {
                        tracing::warn!(
                            "patient {}: single column '{}' has {} items, keeping the first",
                            id,
                            column.name,
                            items.len()
                        );
                        items.truncate(1);
                    }
                    items
                }
                Some(raw_item @ Value::Object(_)) => vec![Item::from_raw(column, raw_item)?],
                Some(other) => {
                    return Err(OpalError::InvalidRecord(format!(
                        "column '{}' must be a list or an object, got {}",
                        column.name, other
                    )));
                }
            };
            columns.insert(column.name.clone(), items);
        }

        Ok(Self { id, columns })
    }

    /// A new patient with one empty item in every single column and nothing elsewhere.
    pub fn blank(id: i64, schema: &Schema) -> Self {
        let columns = schema
            .iter()
            .map(|column| {
                let items = if column.single {
                    vec![Item::default()]
                } else {
                    Vec::new()
                };
                (column.name.clone(), items)
            })
            .collect();
        Self { id, columns }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Items of `column`; empty for columns the schema did not declare.
    pub fn items(&self, column: &str) -> &[Item] {
        self.columns.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn items_mut(&mut self, column: &str) -> Option<&mut Vec<Item>> {
        self.columns.get_mut(column)
    }

    pub fn item(&self, column: &str, index: usize) -> Option<&Item> {
        self.items(column).get(index)
    }

    /// Active ward tags (the `tags` field of the location record).
    pub fn tags(&self) -> Vec<String> {
        self.item(LOCATION_COLUMN, 0)
            .and_then(|location| location.get(TAGS_FIELD))
            .and_then(FieldValue::as_tags)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    /// Raw payload form of the patient, columns in `schema` order.
    pub fn to_raw(&self, schema: &Schema) -> Value {
        let mut map = Map::new();
        map.insert(ID_KEY.to_string(), Value::from(self.id));
        for column in schema {
            let items = self
                .items(&column.name)
                .iter()
                .map(|item| Value::Object(item.to_raw()))
                .collect();
            map.insert(column.name.clone(), Value::Array(items));
        }
        Value::Object(map)
    }
}

/// Parses a JSON array of raw patient records.
pub fn patients_from_json(text: &str, schema: &Schema) -> OpalResult<Vec<Patient>> {
    let raw: Vec<Value> = serde_json::from_str(text).map_err(OpalError::Deserialization)?;
    raw.iter().map(|record| Patient::new(record, schema)).collect()
}

/// Loads a JSON file holding an array of raw patient records.
pub fn load_patients(path: &Path, schema: &Schema) -> OpalResult<Vec<Patient>> {
    let text = std::fs::read_to_string(path).map_err(|source| OpalError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let patients = patients_from_json(&text, schema)?;
    tracing::debug!("loaded {} patients from {}", patients.len(), path.display());
    Ok(patients)
}
