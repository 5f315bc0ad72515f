//! Cell values after header grouping.
//!
//! A workbook cell starts life as a plain string. Header grouping can turn
//! several sibling columns (`label::English`, `label::French`) into one
//! localized map, so a grouped cell is either a scalar or a nested map.
//! Everything downstream works on this explicit two-variant type instead of
//! inspecting value shapes at runtime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A scalar or localized cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Text(String),
    Map(BTreeMap<String, CellValue>),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// The scalar text of this value, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, CellValue>> {
        match self {
            CellValue::Map(map) => Some(map),
            _ => None,
        }
    }

    fn is_empty_map(&self) -> bool {
        matches!(self, CellValue::Map(map) if map.is_empty())
    }

    /// Merge `other` into `self`, reconciling scalars against localized
    /// maps under `default_key` (the workbook's default language).
    ///
    /// The merge is total: a scalar meeting a map without a default entry
    /// is folded in as that map's default entry, a scalar meeting a map
    /// that already has one is dropped, and two scalars collapse to the
    /// first under `default_key`. Map keys merge recursively, first value
    /// winning on scalar conflicts, so the result is independent of which
    /// localized column appeared first.
    pub fn merged(self, other: CellValue, default_key: &str) -> CellValue {
        if self.is_empty_map() {
            return other;
        }
        if other.is_empty_map() {
            return self;
        }
        match (self, other) {
            (CellValue::Map(a), CellValue::Map(b)) => {
                let mut out = a;
                for (key, value) in b {
                    match out.remove(&key) {
                        Some(existing) => {
                            out.insert(key, existing.merged(value, default_key));
                        }
                        None => {
                            out.insert(key, value);
                        }
                    }
                }
                CellValue::Map(out)
            }
            (scalar, CellValue::Map(b)) => {
                if b.contains_key(default_key) {
                    return CellValue::Map(b);
                }
                let mut out = BTreeMap::new();
                out.insert(default_key.to_string(), scalar);
                for (key, value) in b {
                    out.insert(key, value);
                }
                CellValue::Map(out)
            }
            (CellValue::Map(a), scalar) => {
                let mut out = a;
                if !out.contains_key(default_key) {
                    out.insert(default_key.to_string(), scalar);
                }
                CellValue::Map(out)
            }
            // Two scalars under the same key: the first one wins, grouped
            // under the default language.
            (first, _second) => {
                let mut out = BTreeMap::new();
                out.insert(default_key.to_string(), first);
                CellValue::Map(out)
            }
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}
