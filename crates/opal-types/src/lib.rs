/// Errors that can occur when creating validated identifier types.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// The input was empty or contained only whitespace
    #[error("identifier cannot be empty")]
    Empty,
    /// The input did not start with a lowercase ASCII letter
    #[error("identifier '{0}' must start with a lowercase letter")]
    BadStart(String),
    /// The input contained a character outside `[a-z0-9_]`
    #[error("identifier '{0}' contains invalid characters (only a-z, 0-9 and '_' allowed)")]
    InvalidCharacters(String),
}

/// A snake_case name for a schema column or field.
///
/// Column names end up inside modal template URLs and field names are keys of the
/// raw record payload, so both are restricted to lowercase ASCII letters, digits and
/// underscores, starting with a letter. Surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Creates a new `Identifier` from the given input.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(Identifier)` if the trimmed input is a valid identifier,
    /// or an [`IdentifierError`] describing the first problem found.
    pub fn new(input: impl AsRef<str>) -> Result<Self, IdentifierError> {
        let trimmed = input.as_ref().trim();
        let first = trimmed.chars().next().ok_or(IdentifierError::Empty)?;
        if !first.is_ascii_lowercase() {
            return Err(IdentifierError::BadStart(trimmed.to_owned()));
        }

        let ok = trimmed
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_'));
        if !ok {
            return Err(IdentifierError::InvalidCharacters(trimmed.to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::new(s)
    }
}

impl serde::Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Identifier::new(&s).map_err(serde::de::Error::custom)
    }
}
