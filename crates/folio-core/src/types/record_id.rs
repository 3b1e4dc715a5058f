//! Record identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// An opaque record identifier assigned by the document store.
///
/// Ids end up in file names and URL paths, so they are restricted to a
/// conservative character set.
///
/// # Example
///
/// ```
/// use folio_core::RecordId;
///
/// let id = RecordId::new("3f2a9c0e1b7d4e6f").unwrap();
/// assert_eq!(id.as_str(), "3f2a9c0e1b7d4e6f");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Maximum accepted length.
    pub const MAX_LEN: usize = 128;

    /// Create a new record id from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, too long, `.`/`..`, or
    /// contains characters outside `[A-Za-z0-9._~-]`.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: String| -> Error {
            InvalidInputError::RecordId {
                value: s.to_string(),
                reason,
            }
            .into()
        };

        if s.is_empty() {
            return Err(invalid("cannot be empty".to_string()));
        }

        if s.len() > Self::MAX_LEN {
            return Err(invalid(format!(
                "exceeds maximum length of {} characters",
                Self::MAX_LEN
            )));
        }

        if s == "." || s == ".." {
            return Err(invalid("cannot be '.' or '..'".to_string()));
        }

        if let Some(c) = s
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '-' | '_' | '~'))
        {
            return Err(invalid(format!("contains invalid character '{}'", c)));
        }

        Ok(())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
