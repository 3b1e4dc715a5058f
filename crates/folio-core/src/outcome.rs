//! `{success, error}` result shape for admin forms.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::Error;

/// Category of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotFound,
    StoreUnavailable,
    PartialShiftFailure,
    InvalidInput,
}

impl From<&Error> for ErrorKind {
    fn from(err: &Error) -> Self {
        match err {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Error::PartialShiftFailure { .. } => ErrorKind::PartialShiftFailure,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

/// Failure details carried by an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// A serializable operation result.
///
/// ```
/// use folio_core::{Error, Outcome};
///
/// let outcome: Outcome<()> = Err(Error::not_found("awards", "x")).into();
/// assert!(!outcome.success);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

impl<T> Outcome<T> {
    /// A successful outcome.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A failed outcome.
    pub fn err(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(OutcomeError {
                kind: ErrorKind::from(err),
                message: err.to_string(),
            }),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Outcome::ok(data),
            Err(e) => Outcome::err(&e),
        }
    }
}
