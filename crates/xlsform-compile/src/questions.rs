//! Kind-specific question validators.
//!
//! Each function runs an isolated sub-validation over a node's parsed
//! `parameters` column with its own allowed-key set and value checks,
//! then copies the results into the node's bind/control/action maps.

use xlsform_model::{CellValue, CompileError, Diagnostics, Result, SurveyNode};
use xlsform_standards::constants::{
    AUDIO_QUALITY_EXTERNAL, AUDIO_QUALITY_LOW, AUDIO_QUALITY_NORMAL, AUDIO_QUALITY_VOICE_ONLY,
    IDENTIFY_USER, LOCATION_MAX_AGE, LOCATION_MIN_INTERVAL, LOCATION_PRIORITY,
    LOCATION_PRIORITY_VALUES, TRACK_CHANGES, TRACK_CHANGES_REASONS,
};

use crate::params::{self, Parameters};

fn require_bool(name: &str, value: &str) -> Result<()> {
    if value == "true" || value == "false" {
        return Ok(());
    }
    Err(CompileError::message(format!(
        "{name} must be set to true or false: '{value}' is an invalid value."
    )))
}

fn require_int(name: &str, value: &str) -> Result<i64> {
    value.parse::<i64>().map_err(|_| {
        CompileError::message(format!("Parameter {name} must have an integer value."))
    })
}

/// `audit` rows: validate the parameter clusters and attach them to the
/// node's bind map. The three location parameters gate together: all
/// present or none.
pub fn apply_audit(node: &mut SurveyNode, parameters: &Parameters) -> Result<()> {
    params::validate(
        parameters,
        &[
            LOCATION_PRIORITY,
            LOCATION_MIN_INTERVAL,
            LOCATION_MAX_AGE,
            TRACK_CHANGES,
            IDENTIFY_USER,
            TRACK_CHANGES_REASONS,
        ],
    )?;

    if let Some(value) = parameters.get(TRACK_CHANGES) {
        require_bool(TRACK_CHANGES, value)?;
        node.bind
            .insert(format!("odk:{TRACK_CHANGES}"), CellValue::text(value));
    }
    if let Some(value) = parameters.get(TRACK_CHANGES_REASONS) {
        if value != "on-form-edit" {
            return Err(CompileError::message(format!(
                "{TRACK_CHANGES_REASONS} must be set to on-form-edit"
            )));
        }
        node.bind.insert(
            format!("odk:{TRACK_CHANGES_REASONS}"),
            CellValue::text("on-form-edit"),
        );
    }
    if let Some(value) = parameters.get(IDENTIFY_USER) {
        require_bool(IDENTIFY_USER, value)?;
        node.bind
            .insert(format!("odk:{IDENTIFY_USER}"), CellValue::text(value));
    }

    let location_keys = [LOCATION_PRIORITY, LOCATION_MIN_INTERVAL, LOCATION_MAX_AGE];
    if location_keys.iter().any(|key| parameters.contains_key(*key)) {
        if !location_keys.iter().all(|key| parameters.contains_key(*key)) {
            return Err(CompileError::message(format!(
                "To include location information in the audit, '{LOCATION_PRIORITY}', \
                 '{LOCATION_MIN_INTERVAL}', and '{LOCATION_MAX_AGE}' are required \
                 parameters."
            )));
        }
        let priority = &parameters[LOCATION_PRIORITY];
        if !LOCATION_PRIORITY_VALUES.contains(&priority.as_str()) {
            return Err(CompileError::message(format!(
                "Parameter {LOCATION_PRIORITY} must be set to no-power, low-power, \
                 balanced, or high-accuracy: '{priority}' is an invalid value."
            )));
        }
        let min_interval = require_int(LOCATION_MIN_INTERVAL, &parameters[LOCATION_MIN_INTERVAL])?;
        let max_age = require_int(LOCATION_MAX_AGE, &parameters[LOCATION_MAX_AGE])?;
        for (name, value) in [
            (LOCATION_MIN_INTERVAL, min_interval),
            (LOCATION_MAX_AGE, max_age),
        ] {
            if value < 0 {
                return Err(CompileError::message(format!(
                    "Parameter {name} must be greater than or equal to zero."
                )));
            }
        }
        if max_age < min_interval {
            return Err(CompileError::message(format!(
                "Parameter {LOCATION_MAX_AGE} must be greater than or equal to \
                 {LOCATION_MIN_INTERVAL}."
            )));
        }
        for key in location_keys {
            node.bind
                .insert(format!("odk:{key}"), CellValue::text(&parameters[key]));
        }
    }
    Ok(())
}

/// `range` rows: default the start/end/step parameters, require them all
/// numeric, and derive a decimal binding when any of them carries a
/// decimal point.
pub fn apply_range(node: &mut SurveyNode, parameters: &Parameters) -> Result<()> {
    params::validate(parameters, &["start", "end", "step"])?;
    let mut filled = parameters.clone();
    for (key, default) in [("start", "1"), ("end", "10"), ("step", "1")] {
        filled
            .entry(key.to_string())
            .or_insert_with(|| default.to_string());
    }

    let mut has_float = false;
    for value in filled.values() {
        if value.parse::<f64>().is_err() {
            return Err(CompileError::message(
                "Range parameters 'start', 'end' or 'step' must all be numbers.",
            ));
        }
        if value.contains('.') {
            has_float = true;
        }
    }
    if has_float {
        node.bind.insert("type".to_string(), CellValue::text("decimal"));
    }
    node.parameters = filled;
    Ok(())
}

/// `text` rows: the only supported parameter is `rows`, an integer copied
/// into the control map for multiline appearance.
pub fn apply_text(node: &mut SurveyNode, parameters: &Parameters, row_number: u32) -> Result<()> {
    params::validate(parameters, &["rows"])?;
    if let Some(value) = parameters.get("rows") {
        if value.parse::<i64>().is_err() {
            return Err(CompileError::row(
                row_number,
                "Parameter rows must have an integer value.",
            ));
        }
        node.control
            .insert("rows".to_string(), CellValue::text(value));
    }
    Ok(())
}

const IMAGE_PREFIX: &str = "jr://images/";

pub fn apply_photo(
    node: &mut SurveyNode,
    parameters: &Parameters,
    row_number: u32,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    if let Some(default) = node.default.as_ref().and_then(CellValue::as_text)
        && !default.contains(IMAGE_PREFIX)
    {
        node.default = Some(CellValue::Text(format!("{IMAGE_PREFIX}{default}")));
    }
    params::validate(parameters, &["max-pixels", "app"])?;

    if let Some(value) = parameters.get("max-pixels") {
        require_int("max-pixels", value)?;
        node.bind
            .insert("orx:max-pixels".to_string(), CellValue::text(value));
    } else {
        diagnostics.warn(format!(
            "[row : {row_number}] Use the max-pixels parameter to speed up submission \
             sending and save storage space. Learn more: https://xlsform.org/#image"
        ));
    }

    if let Some(app) = parameters.get("app") {
        let appearance = node
            .control
            .get("appearance")
            .and_then(CellValue::as_text);
        if appearance.is_none() || appearance == Some("annotate") {
            match validate_android_package_name(app) {
                None => {
                    node.control
                        .insert("intent".to_string(), CellValue::text(app));
                }
                Some(reason) => return Err(CompileError::row(row_number, reason)),
            }
        }
    }
    Ok(())
}

pub fn apply_audio(node: &mut SurveyNode, parameters: &Parameters) -> Result<()> {
    params::validate(parameters, &["quality"])?;
    if let Some(quality) = parameters.get("quality") {
        let allowed = [
            AUDIO_QUALITY_VOICE_ONLY,
            AUDIO_QUALITY_LOW,
            AUDIO_QUALITY_NORMAL,
            AUDIO_QUALITY_EXTERNAL,
        ];
        if !allowed.contains(&quality.as_str()) {
            return Err(CompileError::message("Invalid value for quality."));
        }
        node.bind
            .insert("odk:quality".to_string(), CellValue::text(quality));
    }
    Ok(())
}

/// `background-audio` records through an action rather than a bind, and
/// cannot use the `external` quality.
pub fn apply_background_audio(node: &mut SurveyNode, parameters: &Parameters) -> Result<()> {
    params::validate(parameters, &["quality"])?;
    if let Some(quality) = parameters.get("quality") {
        let allowed = [
            AUDIO_QUALITY_VOICE_ONLY,
            AUDIO_QUALITY_LOW,
            AUDIO_QUALITY_NORMAL,
        ];
        if !allowed.contains(&quality.as_str()) {
            return Err(CompileError::message("Invalid value for quality."));
        }
        node.action
            .insert("odk:quality".to_string(), CellValue::text(quality));
    }
    Ok(())
}

/// `geopoint`/`geoshape`/`geotrace` rows. Only geopoint supports the
/// accuracy-threshold parameters.
pub fn apply_geo(node: &mut SurveyNode, question_type: &str, parameters: &Parameters) -> Result<()> {
    if question_type == "geopoint" {
        params::validate(
            parameters,
            &["allow-mock-accuracy", "capture-accuracy", "warning-accuracy"],
        )?;
    } else {
        params::validate(parameters, &["allow-mock-accuracy"])?;
    }

    if let Some(value) = parameters.get("allow-mock-accuracy") {
        if value != "true" && value != "false" {
            return Err(CompileError::message("Invalid value for allow-mock-accuracy."));
        }
        node.bind
            .insert("odk:allow-mock-accuracy".to_string(), CellValue::text(value));
    }
    for (param, control_key) in [
        ("capture-accuracy", "accuracyThreshold"),
        ("warning-accuracy", "unacceptableAccuracyThreshold"),
    ] {
        if let Some(value) = parameters.get(param) {
            if value.parse::<f64>().is_err() {
                return Err(CompileError::message(format!(
                    "Parameter {param} must have a numeric value"
                )));
            }
            node.control
                .insert(control_key.to_string(), CellValue::text(value));
        }
    }
    Ok(())
}

/// Android package name check for the photo `app` parameter. Returns a
/// reason string when the name is invalid.
pub fn validate_android_package_name(name: &str) -> Option<String> {
    let prefix = "Parameter 'app' has an invalid Android package name - ";

    if name.trim().is_empty() {
        return Some(format!("{prefix}package name is missing."));
    }
    if !name.contains('.') {
        return Some(format!(
            "{prefix}the package name must have at least one '.' separator."
        ));
    }
    if name.ends_with('.') {
        return Some(format!(
            "{prefix}the package name cannot end in a '.' separator."
        ));
    }
    let segments: Vec<&str> = name.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Some(format!(
            "{prefix}package segments must be of non-zero length."
        ));
    }
    if segments.iter().any(|segment| segment.starts_with('_')) {
        return Some(format!(
            "{prefix}the character '_' cannot be the first character in a package \
             name segment."
        ));
    }
    if segments
        .iter()
        .any(|segment| segment.chars().next().is_some_and(|c| c.is_ascii_digit()))
    {
        return Some(format!(
            "{prefix}a digit cannot be the first character in a package name segment."
        ));
    }
    let legal = |c: char| c.is_ascii_alphanumeric() || c == '.' || c == '_';
    if !name.chars().all(legal) {
        return Some(format!(
            "{prefix}the package name can only include letters (a-z, A-Z), \
             numbers (0-9), dots (.), and underscores (_)."
        ));
    }
    None
}
