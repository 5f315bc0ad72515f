//! XML element name validity.

fn is_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == ':' || c == '_'
}

fn is_tag_char(c: char) -> bool {
    is_start_char(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

/// True if `tag` is usable as an XML element name: it must begin with a
/// letter, colon, or underscore; later characters may add digits, dashes,
/// and periods.
pub fn is_valid_xml_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) if is_start_char(first) => chars.all(is_tag_char),
        _ => false,
    }
}
