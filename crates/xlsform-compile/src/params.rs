//! The `parameters` column mini-language.
//!
//! Values look like `randomize=true;seed=42`. The delimiter is sniffed:
//! `;` first, then `,`, then whitespace, so any one of them works as long
//! as it is used consistently within the cell.

use std::collections::BTreeMap;

use xlsform_model::{CompileError, Result};

pub type Parameters = BTreeMap<String, String>;

// Label and value are matched against user-supplied files, so their case
// is preserved.
const CASE_SENSITIVE_KEYS: &[&str] = &["label", "value"];

/// Parse a raw `parameters` cell into a key/value map.
///
/// Each token must contain exactly one `=`. Keys are lower-cased and
/// trimmed; values likewise except for the case-sensitive keys.
pub fn parse(raw: &str) -> Result<Parameters> {
    let mut parts: Vec<&str> = raw.split(';').collect();
    if parts.len() == 1 {
        parts = raw.split(',').collect();
    }
    if parts.len() == 1 {
        parts = raw.split_whitespace().collect();
    }

    let mut params = Parameters::new();
    for part in parts {
        let malformed = || {
            CompileError::Parameter(
                "Expecting parameters to be in the form of \
                 'parameter1=value parameter2=value'."
                    .to_string(),
            )
        };
        let (key, value) = part.split_once('=').ok_or_else(malformed)?;
        if value.contains('=') {
            return Err(malformed());
        }
        let key = key.trim().to_lowercase();
        let value = if CASE_SENSITIVE_KEYS.contains(&key.as_str()) {
            value.trim().to_string()
        } else {
            value.trim().to_lowercase()
        };
        params.insert(key, value);
    }
    Ok(params)
}

/// Reject any parameter key not named in `allowed`.
pub fn validate(parameters: &Parameters, allowed: &[&str]) -> Result<()> {
    let mut extras: Vec<&str> = parameters
        .keys()
        .map(String::as_str)
        .filter(|key| !allowed.contains(key))
        .collect();
    if extras.is_empty() {
        return Ok(());
    }
    extras.sort_unstable();
    let mut accepted: Vec<&str> = allowed.to_vec();
    accepted.sort_unstable();
    Err(CompileError::Parameter(format!(
        "Accepted parameters are '{}'. The following are invalid parameter(s): '{}'.",
        accepted.join(", "),
        extras.join(", ")
    )))
}

/// Parse and validate in one step.
pub fn parse_parameters(raw: &str, allowed: &[&str]) -> Result<Parameters> {
    let params = parse(raw)?;
    validate(&params, allowed)?;
    Ok(params)
}
