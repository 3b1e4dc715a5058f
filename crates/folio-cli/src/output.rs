//! Output formatting helpers.

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use serde::Serialize;

use folio_core::Outcome;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a command result.
///
/// With `as_json` the result is printed as an [`Outcome`] whether it
/// succeeded or not; otherwise `human` renders a success and failures carry
/// `context`. Either way a failure makes the command fail.
pub fn report<T, F>(
    as_json: bool,
    result: folio_core::Result<T>,
    context: &'static str,
    human: F,
) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> Result<()>,
{
    if as_json {
        let failure = result.as_ref().err().map(|e| e.to_string());
        json(&Outcome::from(result))?;
        return match failure {
            Some(message) => Err(anyhow!(message).context(context)),
            None => Ok(()),
        };
    }

    let value = result.context(context)?;
    human(&value)
}
