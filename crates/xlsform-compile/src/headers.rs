//! Header normalization: alias resolution and language grouping.
//!
//! Raw column headers like `label::French` or the legacy `label:French`
//! are regrouped into nested maps (`{"label": {"French": ...}}`), with the
//! first token resolved through a sheet-specific alias table. Whether the
//! whole workbook uses `::` or the legacy single `:` is decided once per
//! compilation: single colons are ambiguous with namespaced attribute
//! names such as `jr:count`, so `::` wins as soon as it appears anywhere.

use std::collections::BTreeMap;

use xlsform_model::{CellValue, RawRow, Workbook};
use xlsform_standards::aliases::HeaderTarget;

/// A sheet row after header grouping.
pub type NormalizedRow = BTreeMap<String, CellValue>;

const SMART_QUOTES: &[(char, char)] = &[
    ('\u{2018}', '\''),
    ('\u{2019}', '\''),
    ('\u{201c}', '"'),
    ('\u{201d}', '"'),
];

/// True if any column header anywhere in the workbook contains `::`.
pub fn has_double_colon(workbook: &Workbook) -> bool {
    workbook.sheets().any(|(_, rows)| {
        rows.iter()
            .any(|row| row.keys().any(|header| header.contains("::")))
    })
}

pub fn replace_smart_quotes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match SMART_QUOTES.iter().find(|(from, _)| *from == c) {
            Some(&(_, to)) => out.push(to),
            None => out.push(c),
        }
    }
    out
}

// Trim and collapse runs of spaces, as the clean_text_values setting asks.
fn collapse_spaces(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_space = false;
    for c in value.trim().chars() {
        if c == ' ' {
            if !last_was_space {
                out.push(c);
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

fn split_header(header: &str, use_double_colons: bool) -> Vec<String> {
    if use_double_colons {
        return header.split("::").map(|t| t.trim().to_string()).collect();
    }
    // Legacy single-colon grouping. An XForms-namespaced `jr` token is
    // rejoined with its successor so `jr:count` is never read as a
    // language suffix.
    let mut tokens: Vec<String> = header.split(':').map(|t| t.trim().to_string()).collect();
    if let Some(idx) = tokens.iter().position(|t| t == "jr")
        && idx + 1 < tokens.len()
    {
        let next = tokens.remove(idx + 1);
        tokens[idx] = format!("jr:{next}");
    }
    tokens
}

/// Normalize one sheet's rows: apply smart-quote replacement (and
/// optional whitespace cleanup) to every cell, split and dealias headers,
/// and deep-merge the resulting nested values per row. `default_language`
/// is the merge key reconciling bare and localized spellings of the same
/// column.
pub fn normalize(
    rows: &[RawRow],
    alias: fn(&str) -> Option<HeaderTarget>,
    use_double_colons: bool,
    default_language: &str,
    clean_whitespace: bool,
) -> Vec<NormalizedRow> {
    rows.iter()
        .map(|row| normalize_row(row, alias, use_double_colons, default_language, clean_whitespace))
        .collect()
}

fn normalize_row(
    row: &RawRow,
    alias: fn(&str) -> Option<HeaderTarget>,
    use_double_colons: bool,
    default_language: &str,
    clean_whitespace: bool,
) -> NormalizedRow {
    let mut out = NormalizedRow::new();
    for (header, raw_value) in row {
        let mut value = replace_smart_quotes(raw_value);
        if clean_whitespace {
            value = collapse_spaces(&value);
        }

        let mut tokens = split_header(header, use_double_colons);
        let dealiased: Vec<String> = match alias(&tokens[0]) {
            Some(HeaderTarget::Key(key)) => vec![key.to_string()],
            Some(HeaderTarget::Nested(outer, inner)) => {
                vec![outer.to_string(), inner.to_string()]
            }
            None => vec![tokens[0].clone()],
        };
        tokens.splice(0..1, dealiased);

        // Right-nest the remaining tokens around the cell value:
        // [label, French] + "Bonjour" -> {label: {French: "Bonjour"}}.
        let mut nested = CellValue::Text(value);
        for token in tokens[1..].iter().rev() {
            let mut map = BTreeMap::new();
            map.insert(token.clone(), nested);
            nested = CellValue::Map(map);
        }
        let key = tokens[0].clone();
        match out.remove(&key) {
            Some(existing) => {
                out.insert(key, existing.merged(nested, default_language));
            }
            None => {
                out.insert(key, nested);
            }
        }
    }
    out
}
