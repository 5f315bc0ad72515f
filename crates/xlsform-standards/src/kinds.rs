use std::fmt;

use serde::Serialize;

/// Container row kinds introduced by `begin`/`end` row pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Group,
    Repeat,
    Loop,
}

impl ControlKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlKind::Group => "group",
            ControlKind::Repeat => "repeat",
            ControlKind::Loop => "loop",
        }
    }

    /// Capitalized form for user-facing messages.
    pub fn title(self) -> &'static str {
        match self {
            ControlKind::Group => "Group",
            ControlKind::Repeat => "Repeat",
            ControlKind::Loop => "Loop",
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Select command families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectKind {
    One,
    OneExternal,
    Multiple,
    Rank,
}

impl SelectKind {
    /// The output tag for this select family.
    pub fn as_str(self) -> &'static str {
        match self {
            SelectKind::One => "select one",
            SelectKind::OneExternal => "select one external",
            SelectKind::Multiple => "select all that apply",
            SelectKind::Rank => "rank",
        }
    }
}

impl fmt::Display for SelectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
