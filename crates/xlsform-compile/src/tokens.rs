//! Row `type` tokenizer.
//!
//! Replaces the per-call regex grammars of the original tool with a
//! single pass over the static alias tables. Aliases are tried longest
//! first, which reproduces regex backtracking for multi-word keywords
//! like `looped group`.

use xlsform_standards::aliases::{self, SelectAlias};
use xlsform_standards::kinds::ControlKind;

/// Classification of a survey row's `type` cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeToken {
    /// `begin <control> [over <list>]` / `begin <control> <list>`
    Begin {
        kind: ControlKind,
        list_name: Option<String>,
    },
    /// `end <control>`
    End { kind: ControlKind },
    /// `<select-command> <list> [or specify other]`
    Select {
        alias: SelectAlias,
        command: String,
        list_name: String,
        or_other: bool,
    },
    /// `osm <list>`
    Osm { list_name: String },
    /// Anything else: plain question kinds, settings aliases, or rows
    /// that only almost match a grammar (those fall through unchanged,
    /// as the original tool's regexes did).
    Other,
}

const OR_OTHER_SUFFIXES: &[&str] = &[" or specify other", " or_other", " or other"];

pub fn classify(question_type: &str) -> TypeToken {
    if let Some(token) = parse_end(question_type) {
        return token;
    }
    if let Some(token) = parse_begin(question_type) {
        return token;
    }
    if let Some(token) = parse_select(question_type) {
        return token;
    }
    if let Some(token) = parse_osm(question_type) {
        return token;
    }
    TypeToken::Other
}

// `begin`/`end` are separated from the keyword by a single space or
// underscore.
fn strip_command<'a>(value: &'a str, command: &str) -> Option<&'a str> {
    let rest = value.strip_prefix(command)?;
    let mut chars = rest.chars();
    match chars.next() {
        Some(' ') | Some('_') => Some(chars.as_str()),
        _ => None,
    }
}

fn parse_end(question_type: &str) -> Option<TypeToken> {
    let rest = strip_command(question_type, "end")?;
    aliases::control(rest).map(|kind| TypeToken::End { kind })
}

fn parse_begin(question_type: &str) -> Option<TypeToken> {
    let rest = strip_command(question_type, "begin")?;
    for alias in aliases::CONTROL_ALIASES {
        let Some(kind) = aliases::control(alias) else {
            continue;
        };
        if rest == *alias {
            return Some(TypeToken::Begin {
                kind,
                list_name: None,
            });
        }
        let Some(tail) = rest.strip_prefix(alias).and_then(|t| t.strip_prefix(' ')) else {
            continue;
        };
        let list = tail.strip_prefix("over ").unwrap_or(tail);
        if !list.is_empty() && !list.contains(char::is_whitespace) {
            return Some(TypeToken::Begin {
                kind,
                list_name: Some(list.to_string()),
            });
        }
    }
    None
}

fn parse_select(question_type: &str) -> Option<TypeToken> {
    for command in aliases::SELECT_ALIASES {
        let Some(alias) = aliases::select(command) else {
            continue;
        };
        let Some(rest) = question_type
            .strip_prefix(command)
            .and_then(|t| t.strip_prefix(' '))
        else {
            continue;
        };
        let (rest, or_other) = match OR_OTHER_SUFFIXES
            .iter()
            .find_map(|suffix| rest.strip_suffix(suffix))
        {
            Some(stripped) => (stripped, true),
            None => (rest, false),
        };
        if !rest.is_empty() && !rest.contains(char::is_whitespace) {
            return Some(TypeToken::Select {
                alias,
                command: (*command).to_string(),
                list_name: rest.to_string(),
                or_other,
            });
        }
    }
    None
}

fn parse_osm(question_type: &str) -> Option<TypeToken> {
    let mut tokens = question_type.split_whitespace();
    if aliases::OSM_ALIASES.contains(&tokens.next()?) {
        let list_name = tokens.next()?;
        return Some(TypeToken::Osm {
            list_name: list_name.to_string(),
        });
    }
    None
}
