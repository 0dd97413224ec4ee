//! Column/field schema for patient records.
//!
//! A [`Schema`] is the ordered declaration of the columns shown on the ward list. Each
//! [`Column`] groups the fields of one kind of subrecord (demographics, diagnosis, ...) and
//! says whether a patient holds at most one such record (`single`) or a list of them.
//!
//! Schemas are constructed once from static configuration and are immutable afterwards.
//! [`Schema::new`] stores columns verbatim; the loaders additionally run [`Schema::validate`].

use crate::validation::{validate_column_names, validate_field_names};
use crate::{OpalError, OpalResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_SCHEMA_YAML: &str = include_str!("../schema/opal.yaml");

/// Type of a schema field, controlling how raw values are normalised.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    /// `YYYY-MM-DD` text parsed into a date.
    Date,
    Boolean,
    /// Tag set given as `{tag: bool}`, normalised to the active tag names.
    List,
    /// Any other type name; values pass through unchanged.
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
            FieldType::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "string" => FieldType::String,
            "date" => FieldType::Date,
            "boolean" => FieldType::Boolean,
            "list" => FieldType::List,
            _ => FieldType::Other(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A named, possibly repeating group of fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// At most one record per patient when `true`.
    #[serde(default)]
    pub single: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl Column {
    pub fn new(name: impl Into<String>, single: bool, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            single,
            fields,
        }
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Ordered declaration of the columns of a patient record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Stores `columns` verbatim. No validation is performed; see [`Schema::validate`].
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Parses and validates a schema from YAML text (a sequence of columns).
    ///
    /// # Errors
    ///
    /// Returns [`OpalError::YamlDeserialization`] if the text is not a column list, or
    /// [`OpalError::InvalidSchema`] if validation fails.
    pub fn from_yaml(text: &str) -> OpalResult<Self> {
        let schema: Schema = serde_yaml::from_str(text).map_err(OpalError::YamlDeserialization)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Parses and validates a schema from JSON text (an array of columns).
    pub fn from_json(text: &str) -> OpalResult<Self> {
        let schema: Schema = serde_json::from_str(text).map_err(OpalError::Deserialization)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Loads a schema file; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> OpalResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| OpalError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let schema = if is_json {
            Self::from_json(&text)?
        } else {
            Self::from_yaml(&text)?
        };
        tracing::debug!("loaded schema with {} columns from {}", schema.len(), path.display());
        Ok(schema)
    }

    /// The default ward-list schema shipped with the crate.
    pub fn default_opal() -> OpalResult<Self> {
        Self::from_yaml(DEFAULT_SCHEMA_YAML)
    }

    /// Checks that column names are unique identifiers and that field names are unique
    /// identifiers within each column.
    pub fn validate(&self) -> OpalResult<()> {
        validate_column_names(self.columns.iter().map(|c| c.name.as_str()))?;
        for column in &self.columns {
            validate_field_names(
                &column.name,
                column.fields.iter().map(|f| f.name.as_str()),
            )?;
        }
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Index of the column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
