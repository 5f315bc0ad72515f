//! In-memory workbook as produced by an external spreadsheet reader.
//!
//! Sheet lookup is case-insensitive while the original casing is retained
//! for diagnostics. Sheet row order is significant and preserved; the order
//! in which sheets were added is not.

use std::collections::BTreeMap;
use std::collections::HashMap;

/// A raw sheet row: column header to pre-stringified cell value. Readers
/// are expected to omit empty cells rather than insert empty strings.
pub type RawRow = BTreeMap<String, String>;

#[derive(Debug, Clone)]
struct Sheet {
    name: String,
    rows: Vec<RawRow>,
}

/// The full set of named input sheets presented to the compiler.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    // lowercased name -> index into `sheets`; first occurrence wins
    index: HashMap<String, usize>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sheets<I, S>(sheets: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<RawRow>)>,
        S: Into<String>,
    {
        let mut workbook = Self::new();
        for (name, rows) in sheets {
            workbook.insert_sheet(name, rows);
        }
        workbook
    }

    pub fn insert_sheet(&mut self, name: impl Into<String>, rows: Vec<RawRow>) {
        let name = name.into();
        let key = name.to_lowercase();
        let slot = self.sheets.len();
        self.sheets.push(Sheet { name, rows });
        self.index.entry(key).or_insert(slot);
    }

    /// Look a sheet up by name, ignoring case.
    pub fn sheet(&self, name: &str) -> Option<&[RawRow]> {
        self.index
            .get(&name.to_lowercase())
            .map(|&slot| self.sheets[slot].rows.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    /// Sheet names in their original casing.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str())
    }

    /// All sheets with their rows, in insertion order.
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &[RawRow])> {
        self.sheets
            .iter()
            .map(|sheet| (sheet.name.as_str(), sheet.rows.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
