//! Alias tables for elements spelled differently on the XLSForm than in
//! the output tree.
//!
//! Every table is a closed `match`; row-type grammars are built by the
//! tokenizer from the `*_ALIASES` keyword slices, which are ordered
//! longest-first so multi-word aliases win over their prefixes.

use crate::kinds::{ControlKind, SelectKind};

/// Keywords accepted after `begin`/`end`, longest first.
pub const CONTROL_ALIASES: &[&str] = &["looped group", "lgroup", "repeat", "group", "loop"];

pub fn control(token: &str) -> Option<ControlKind> {
    match token {
        "group" => Some(ControlKind::Group),
        "lgroup" | "repeat" | "looped group" => Some(ControlKind::Repeat),
        "loop" => Some(ControlKind::Loop),
        _ => None,
    }
}

/// A resolved select command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectAlias {
    pub kind: SelectKind,
    /// True for the `*_from_file` command family, whose list name is a
    /// file reference rather than a choices-sheet list.
    pub from_file: bool,
}

/// Select command spellings, longest first.
pub const SELECT_ALIASES: &[&str] = &[
    "add select multiple prompt using",
    "add select one prompt using",
    "select all that apply from",
    "select multiple from file",
    "select_multiple_from_file",
    "select all that apply",
    "select one from file",
    "select_one_from_file",
    "select_one_external",
    "select one from",
    "select_multiple",
    "select_one",
    "select one",
    "select1",
    "rank",
];

pub fn select(token: &str) -> Option<SelectAlias> {
    let alias = |kind, from_file| Some(SelectAlias { kind, from_file });
    match token {
        "add select one prompt using" | "select one from" | "select1" | "select_one"
        | "select one" => alias(SelectKind::One, false),
        "add select multiple prompt using" | "select all that apply from" | "select_multiple"
        | "select all that apply" => alias(SelectKind::Multiple, false),
        "select_one_external" => alias(SelectKind::OneExternal, false),
        "select_one_from_file" | "select one from file" => alias(SelectKind::One, true),
        "select_multiple_from_file" | "select multiple from file" => {
            alias(SelectKind::Multiple, true)
        }
        "rank" => alias(SelectKind::Rank, false),
        _ => None,
    }
}

/// The OSM command keyword.
pub const OSM_ALIASES: &[&str] = &["osm"];

/// In-sheet settings declarations: `type` values that write into the
/// root settings map instead of creating a node.
pub fn settings_header(token: &str) -> Option<&'static str> {
    match token {
        "form_title" | "set_form_title" => Some("title"),
        "form_id" | "set_form_id" => Some("id_string"),
        "prefix" => Some("prefix"),
        _ => None,
    }
}

/// Where a survey column header lands after aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTarget {
    /// A canonical top-level key.
    Key(&'static str),
    /// A key nested one level down, e.g. `relevant` -> `bind.relevant`.
    Nested(&'static str, &'static str),
}

/// Survey sheet column aliases: user-friendly spellings to their place
/// in the output node.
pub fn survey_header(token: &str) -> Option<HeaderTarget> {
    use HeaderTarget::{Key, Nested};
    match token {
        "compact_tag" => Some(Nested("instance", "odk:tag")),
        "read_only" | "readonly" => Some(Nested("bind", "readonly")),
        "relevant" | "relevance" => Some(Nested("bind", "relevant")),
        "caption" => Some(Key("label")),
        "appearance" => Some(Nested("control", "appearance")),
        "required" => Some(Nested("bind", "required")),
        "constraint" => Some(Nested("bind", "constraint")),
        "constraining_message" | "constraint_message" => Some(Nested("bind", "jr:constraintMsg")),
        "calculation" | "calculate" => Some(Nested("bind", "calculate")),
        "command" => Some(Key("type")),
        "tag" | "value" => Some(Key("name")),
        "image" => Some(Nested("media", "image")),
        "big-image" => Some(Nested("media", "big-image")),
        "audio" => Some(Nested("media", "audio")),
        "video" => Some(Nested("media", "video")),
        "count" | "repeat_count" | "jr:count" => Some(Nested("control", "jr:count")),
        "autoplay" => Some(Nested("control", "autoplay")),
        "rows" => Some(Nested("control", "rows")),
        "noapperrorstring" | "no_app_error_string" => Some(Nested("bind", "jr:noAppErrorString")),
        "requiredmsg" | "required_message" => Some(Nested("bind", "jr:requiredMsg")),
        "body" => Some(Key("control")),
        _ => None,
    }
}

/// Choices/external_choices/osm sheet column aliases.
pub fn list_header(token: &str) -> Option<HeaderTarget> {
    use HeaderTarget::{Key, Nested};
    match token {
        "caption" => Some(Key("label")),
        "list_name" => Some(Key(crate::constants::LIST_NAME)),
        "value" => Some(Key("name")),
        "image" => Some(Nested("media", "image")),
        "big-image" => Some(Nested("media", "big-image")),
        "audio" => Some(Nested("media", "audio")),
        "video" => Some(Nested("media", "video")),
        _ => None,
    }
}

/// Legacy `type` spellings for plain question rows.
pub fn question_type(token: &str) -> Option<&'static str> {
    match token {
        "imei" => Some("deviceid"),
        "image" | "add image prompt" | "add photo prompt" => Some("photo"),
        "add audio prompt" => Some("audio"),
        "add video prompt" => Some("video"),
        "add file prompt" => Some("file"),
        _ => None,
    }
}

/// Free-text yes/no cells. Unknown spellings return `None` so callers
/// can pick their own default.
pub fn yes_no(value: &str) -> Option<bool> {
    match value {
        "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "true()" => Some(true),
        "no" | "No" | "NO" | "false" | "False" | "FALSE" | "false()" => Some(false),
        _ => None,
    }
}

/// Question types that may go without a label.
pub fn is_label_optional(question_type: &str) -> bool {
    matches!(
        question_type,
        "calculate"
            | "deviceid"
            | "end"
            | "phonenumber"
            | "simserial"
            | "start"
            | "start-geopoint"
            | "today"
            | "username"
    )
}

/// Device-identifying metadata types no longer supported on current
/// clients.
pub fn is_deprecated_device_id(question_type: &str) -> bool {
    matches!(question_type, "subscriberid" | "simserial")
}
