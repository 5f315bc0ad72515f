//! Fixed names and message fragments of the XLSForm grammar.

pub const SURVEY: &str = "survey";
pub const CHOICES: &str = "choices";
pub const SETTINGS: &str = "settings";
pub const EXTERNAL_CHOICES: &str = "external_choices";
pub const OSM: &str = "osm";

/// Sheet names the compiler recognizes. Anything else is auxiliary data
/// and only ever mentioned by the misspelling heuristic.
pub const SUPPORTED_SHEET_NAMES: &[&str] =
    &[SURVEY, CHOICES, SETTINGS, EXTERNAL_CHOICES, OSM];

/// The grouping key on choices/external_choices/osm sheets after header
/// aliasing.
pub const LIST_NAME: &str = "list name";

pub const DEFAULT_FORM_NAME: &str = "data";
pub const DEFAULT_LANGUAGE: &str = "default";

/// File extensions that make a select list an external instance
/// reference rather than an inline choice list.
pub const EXTERNAL_INSTANCE_EXTENSIONS: &[&str] = &[".xml", ".csv", ".geojson"];

pub const TABLE_LIST: &str = "table-list";
pub const FIELD_LIST: &str = "field-list";
pub const LIST_NOLABEL: &str = "list-nolabel";

pub const AUDIO_QUALITY_VOICE_ONLY: &str = "voice-only";
pub const AUDIO_QUALITY_LOW: &str = "low";
pub const AUDIO_QUALITY_NORMAL: &str = "normal";
pub const AUDIO_QUALITY_EXTERNAL: &str = "external";

pub const LOCATION_PRIORITY: &str = "location-priority";
pub const LOCATION_MIN_INTERVAL: &str = "location-min-interval";
pub const LOCATION_MAX_AGE: &str = "location-max-age";
pub const TRACK_CHANGES: &str = "track-changes";
pub const IDENTIFY_USER: &str = "identify-user";
pub const TRACK_CHANGES_REASONS: &str = "track-changes-reasons";

pub const LOCATION_PRIORITY_VALUES: &[&str] =
    &["no-power", "low-power", "balanced", "high-accuracy"];

pub const XML_IDENTIFIER_ERROR_MESSAGE: &str = "must begin with a letter, colon, or underscore. \
     Other characters can include numbers, dashes, and periods.";

pub const MSG_SUPPRESS_SPELLING: &str =
    " If you do not mean to include a sheet, to suppress this message, \
     prefix the sheet name with an underscore. For example 'setting' \
     becomes '_setting'.";
