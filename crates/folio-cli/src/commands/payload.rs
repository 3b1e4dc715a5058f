//! Reading JSON payloads for insert and move.

use std::io::{self, Read};

use serde_json::Value;

use folio_core::FieldPatch;
use folio_core::error::InvalidInputError;

/// Read a JSON object from a file, or from stdin when `source` is `-`.
///
/// No source means an empty patch.
pub fn read(source: Option<&str>) -> folio_core::Result<FieldPatch> {
    let Some(source) = source else {
        return Ok(FieldPatch::new());
    };

    let content = if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source)?
    };

    let value: Value = serde_json::from_str(&content).map_err(|e| InvalidInputError::Other {
        message: format!("invalid JSON in {}: {}", display_name(source), e),
    })?;
    FieldPatch::from_value(value)
}

fn display_name(source: &str) -> &str {
    if source == "-" { "stdin" } else { source }
}
