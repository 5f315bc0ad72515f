use std::collections::BTreeMap;

use crate::value::CellValue;

/// Resolved settings: a flat map with case-insensitive keys.
///
/// Alias resolution, defaults and yes/no coercion happen in the settings
/// resolver; this type only stores the outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: BTreeMap<String, CellValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) {
        self.values.insert(key.into().to_lowercase(), value);
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.values.get(&key.to_lowercase())
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(CellValue::as_text)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(&key.to_lowercase())
    }

    pub fn remove(&mut self, key: &str) -> Option<CellValue> {
        self.values.remove(&key.to_lowercase())
    }

    /// The default language for localized columns; `"default"` if unset.
    pub fn default_language(&self) -> &str {
        self.text("default_language").unwrap_or("default")
    }

    pub fn id_string(&self) -> Option<&str> {
        self.text("id_string")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CellValue)> {
        self.values.iter()
    }

    pub fn into_values(self) -> BTreeMap<String, CellValue> {
        self.values
    }
}
