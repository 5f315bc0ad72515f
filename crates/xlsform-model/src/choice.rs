use std::collections::BTreeMap;

use serde::Serialize;

use crate::value::CellValue;

/// One option row in a named choice list.
///
/// Order within a list is preserved end to end; it drives default item
/// ordering in the generated form. The same shape doubles as an OSM tag
/// row, where `choices` carries the nested tag values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<CellValue>,
    /// Passthrough columns (choice_filter keys, geometry, media, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, CellValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl Choice {
    pub fn new(name: impl Into<String>) -> Self {
        Choice {
            name: name.into(),
            label: None,
            extra: BTreeMap::new(),
            choices: Vec::new(),
        }
    }
}

/// Named, ordered choice lists keyed by list name.
pub type ChoiceLists = BTreeMap<String, Vec<Choice>>;
