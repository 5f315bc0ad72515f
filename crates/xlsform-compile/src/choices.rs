//! Choice list construction and validation.

use std::collections::BTreeSet;

use xlsform_model::{Choice, ChoiceLists, CompileError, Diagnostics, RawRow, Result};
use xlsform_standards::aliases;
use xlsform_standards::constants::LIST_NAME;

use crate::headers::{self, NormalizedRow};

fn row_to_choice(row: NormalizedRow) -> Choice {
    let mut choice = Choice::new("");
    for (key, value) in row {
        match key.as_str() {
            "name" => {
                if let Some(text) = value.as_text() {
                    choice.name = text.to_string();
                }
            }
            "label" => choice.label = Some(value),
            _ => {
                choice.extra.insert(key, value);
            }
        }
    }
    choice
}

/// Group normalized rows by their `list name` column, preserving both the
/// order lists first appear in and row order within each list. Rows
/// without a list name are dropped, as are rows whose list name is not a
/// plain string.
fn group_by_list_name(rows: Vec<NormalizedRow>) -> Vec<(String, Vec<NormalizedRow>)> {
    let mut groups: Vec<(String, Vec<NormalizedRow>)> = Vec::new();
    for mut row in rows {
        let Some(list_name) = row
            .remove(LIST_NAME)
            .and_then(|v| v.as_text().map(str::to_string))
        else {
            continue;
        };
        match groups.iter_mut().find(|(name, _)| *name == list_name) {
            Some((_, group)) => group.push(row),
            None => groups.push((list_name, vec![row])),
        }
    }
    groups
}

/// Build unvalidated lists (external choices, OSM tag sheets).
pub fn build_unchecked(
    rows: &[RawRow],
    use_double_colons: bool,
    default_language: &str,
) -> ChoiceLists {
    let normalized = headers::normalize(
        rows,
        aliases::list_header,
        use_double_colons,
        default_language,
        false,
    );
    group_by_list_name(normalized)
        .into_iter()
        .map(|(name, rows)| (name, rows.into_iter().map(row_to_choice).collect()))
        .collect()
}

/// Build and validate the `choices` sheet lists.
///
/// Missing names are fatal; missing labels only warn, since some forms
/// use the choices sheet for option sets that are names alone. Column
/// headers containing spaces (stray note columns, usually) are dropped
/// with one warning per header; blank headers are dropped with a warning
/// per cell. Duplicate names within a list are fatal unless
/// `allow_duplicates` says otherwise.
pub fn build(
    rows: &[RawRow],
    use_double_colons: bool,
    default_language: &str,
    allow_duplicates: bool,
    diagnostics: &mut Diagnostics,
) -> Result<ChoiceLists> {
    let normalized = headers::normalize(
        rows,
        aliases::list_header,
        use_double_colons,
        default_language,
        false,
    );
    let grouped = group_by_list_name(normalized);

    let mut warned_headers: BTreeSet<String> = BTreeSet::new();
    let mut lists = ChoiceLists::new();
    for (list_name, rows) in grouped {
        let mut names: Vec<String> = Vec::new();
        let mut choices: Vec<Choice> = Vec::new();
        for mut row in rows {
            if !row.contains_key("name") {
                return Err(CompileError::message(format!(
                    "On the choices sheet there is a option with no name. \
                     [list_name : {list_name}]"
                )));
            }
            if !row.contains_key("label") {
                diagnostics.warn(format!(
                    "On the choices sheet there is a option with no label. \
                     [list_name : {list_name}]"
                ));
            }
            let headers: Vec<String> = row.keys().cloned().collect();
            for header in headers {
                if header.contains(' ') {
                    if warned_headers.insert(header.clone()) {
                        diagnostics.warn(format!(
                            "On the choices sheet there is a column (\"{header}\") \
                             with an illegal header. Headers cannot include spaces."
                        ));
                    }
                    row.remove(&header);
                } else if header.is_empty() {
                    diagnostics
                        .warn("On the choices sheet there is a value in a column with no header.");
                    row.remove(&header);
                }
            }
            let choice = row_to_choice(row);
            names.push(choice.name.clone());
            choices.push(choice);
        }

        let duplicates = duplicated_names(&names);
        if !duplicates.is_empty() && !allow_duplicates {
            let listed: Vec<String> = duplicates.iter().map(|name| format!("'{name}'")).collect();
            return Err(CompileError::message(format!(
                "The name column for the '{list_name}' choice list contains these \
                 duplicates: {}. Duplicate names will be impossible to identify in \
                 analysis unless a previous value in a cascading select \
                 differentiates them. If this is intentional, you can set the \
                 allow_choice_duplicates setting to 'yes'. \
                 Learn more: https://xlsform.org/#choice-names.",
                listed.join(", ")
            )));
        }

        lists.insert(list_name, choices);
    }
    Ok(lists)
}

// Names that occur more than once, in first-occurrence order.
fn duplicated_names(names: &[String]) -> Vec<&String> {
    let mut duplicates = Vec::new();
    for (idx, name) in names.iter().enumerate() {
        let first = names.iter().position(|n| n == name) == Some(idx);
        let repeated = names.iter().filter(|n| *n == name).count() > 1;
        if first && repeated {
            duplicates.push(name);
        }
    }
    duplicates
}

