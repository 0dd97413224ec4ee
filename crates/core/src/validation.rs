//! Schema name validation.
//!
//! Column names are embedded into modal template URLs (`<root>/<column>.html/`) and both column
//! and field names are keys of the raw record payload. These checks make sure every name is a
//! snake_case [`Identifier`] and that no name is declared twice in the same scope.

use crate::{OpalError, OpalResult};
use opal_types::Identifier;
use std::collections::HashSet;

/// Parses `name` as an identifier, refusing names that only validate once trimmed.
fn exact_identifier(name: &str) -> Result<Identifier, String> {
    let id = Identifier::new(name).map_err(|e| e.to_string())?;
    if id.as_str() != name {
        return Err(format!("'{name}' has surrounding whitespace"));
    }
    Ok(id)
}

/// Validates the column names of a schema.
///
/// # Errors
///
/// Returns `OpalError::InvalidSchema` if a name is not a valid identifier or appears twice.
pub fn validate_column_names<'a>(names: impl IntoIterator<Item = &'a str>) -> OpalResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        let id = exact_identifier(name)
            .map_err(|e| OpalError::InvalidSchema(format!("column name: {e}")))?;
        if !seen.insert(id) {
            return Err(OpalError::InvalidSchema(format!(
                "duplicate column name '{name}'"
            )));
        }
    }
    Ok(())
}

/// Validates the field names declared by one column.
///
/// `id` is reserved: it carries the item identifier and is never a declared field.
pub fn validate_field_names<'a>(
    column: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> OpalResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        let id = exact_identifier(name)
            .map_err(|e| OpalError::InvalidSchema(format!("column '{column}' field name: {e}")))?;
        if id.as_str() == crate::constants::ID_KEY {
            return Err(OpalError::InvalidSchema(format!(
                "column '{column}' declares reserved field 'id'"
            )));
        }
        if !seen.insert(id) {
            return Err(OpalError::InvalidSchema(format!(
                "duplicate field name '{name}' in column '{column}'"
            )));
        }
    }
    Ok(())
}
