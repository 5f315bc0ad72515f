//! Settings sheet resolution.

use xlsform_model::{CellValue, Diagnostics, RawRow, Settings};
use xlsform_standards::aliases::{self, HeaderTarget};
use xlsform_standards::constants::DEFAULT_LANGUAGE;

use crate::headers;

fn settings_alias(token: &str) -> Option<HeaderTarget> {
    aliases::settings_header(token).map(HeaderTarget::Key)
}

/// Resolve the settings sheet into a canonical settings map.
///
/// Only the first row is meaningful; later rows are ignored. `fallback_name`
/// seeds `id_string` when the sheet does not provide one, `default_language`
/// is the caller-level default that the sheet may override.
pub fn resolve(
    settings_rows: &[RawRow],
    use_double_colons: bool,
    fallback_name: &str,
    default_language: &str,
    diagnostics: &mut Diagnostics,
) -> Settings {
    let mut first_row = settings_rows.first().cloned().unwrap_or_default();

    // form_id and id_string are documented aliases of the same concept;
    // a row carrying both is a common user error. The id_string value is
    // dropped so the alias wins.
    if first_row.contains_key("form_id") && first_row.contains_key("id_string") {
        first_row.remove("id_string");
        diagnostics.warn(
            "The form_id and id_string column headers are both specified in the \
             settings sheet provided. This may cause errors during conversion. \
             In future, its best to avoid specifying both column headers in the \
             settings sheet.",
        );
    }

    let normalized = headers::normalize(
        &[first_row],
        settings_alias,
        use_double_colons,
        DEFAULT_LANGUAGE,
        false,
    );

    let mut settings = Settings::new();
    for (key, value) in normalized.into_iter().next().unwrap_or_default() {
        settings.insert(key, value);
    }

    // Boolean-like settings arrive as free text; add_none_option is the
    // one legacy flag resolved to a real boolean in the output.
    if let Some(value) = settings.text("add_none_option").map(str::to_string) {
        let enabled = aliases::yes_no(&value).unwrap_or(false);
        settings.insert("add_none_option", CellValue::Bool(enabled));
    }

    if !settings.contains("id_string") {
        settings.insert("id_string", CellValue::text(fallback_name));
    }
    if !settings.contains("sms_keyword") {
        let id_string = settings.id_string().unwrap_or(fallback_name).to_string();
        settings.insert("sms_keyword", CellValue::Text(id_string));
    }
    if !settings.contains("title") {
        let id_string = settings.id_string().unwrap_or(fallback_name).to_string();
        settings.insert("title", CellValue::Text(id_string));
    }
    if !settings.contains("default_language") {
        settings.insert("default_language", CellValue::text(default_language));
    }
    settings
}
