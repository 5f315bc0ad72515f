//! Small expression heuristics shared by the row compiler.

/// True if `value` contains a `${...}` field reference.
pub fn contains_reference(value: &str) -> bool {
    value
        .find("${")
        .is_some_and(|start| value[start..].contains('}'))
}

/// True if `value` is exactly one `${...}` reference and nothing else.
/// Such repeat-count expressions can be referenced directly without a
/// generated calculate node.
pub fn is_single_reference(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.starts_with("${")
        && trimmed.ends_with('}')
        && !trimmed[2..trimmed.len() - 1].contains('}')
}

/// True if a `default` value is dynamic: it references another field,
/// calls a function, or does arithmetic. Plain dates and geo values get
/// a pass on `-` since those legitimately contain hyphens.
pub fn default_is_dynamic(default: &str, question_type: &str) -> bool {
    if contains_reference(default) {
        return true;
    }
    if default.contains('(') || default.contains('[') {
        return true;
    }
    let hyphen_is_literal = matches!(
        question_type,
        "date" | "dateTime" | "geopoint" | "geotrace" | "geoshape"
    );
    if default.contains('-') && !hyphen_is_literal {
        return true;
    }
    if default.contains('+') || default.contains('*') || default.contains('|') {
        return true;
    }
    default
        .split_whitespace()
        .any(|token| token == "div" || token == "mod")
}

/// The file extension of a select list name, dot included, or empty.
pub fn file_extension(list_name: &str) -> &str {
    let base = list_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(list_name);
    match base.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &base[idx..],
    }
}

/// How many dot-separated suffixes the list name carries. A from-file
/// list must have exactly one.
pub fn suffix_count(list_name: &str) -> usize {
    let base = list_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(list_name);
    let base = base.strip_prefix('.').unwrap_or(base);
    base.matches('.').count()
}
