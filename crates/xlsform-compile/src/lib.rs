//! XLSForm workbook front-end: normalizes spreadsheet rows into the typed
//! survey tree defined by `xlsform-model`.
//!
//! [`compile`] is the entry point. It consumes an already-read
//! [`xlsform_model::Workbook`] (this crate does no file I/O), resolves
//! settings, builds choice lists, and runs the row compiler. Warnings
//! accumulate in a caller-provided [`xlsform_model::Diagnostics`] in the
//! order they are discovered; the first fatal error aborts with a
//! [`xlsform_model::CompileError`].

pub mod choices;
pub mod compiler;
pub mod expression;
pub mod headers;
pub mod params;
pub mod questions;
pub mod settings;
pub mod spelling;
pub mod tokens;
pub mod xml_name;

pub use compiler::{CompileOptions, compile};
