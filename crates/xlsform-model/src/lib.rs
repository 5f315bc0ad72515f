pub mod choice;
pub mod diagnostics;
pub mod error;
pub mod settings;
pub mod survey;
pub mod value;
pub mod workbook;

pub use choice::{Choice, ChoiceLists};
pub use diagnostics::Diagnostics;
pub use error::{CompileError, Result};
pub use settings::Settings;
pub use survey::{NodeId, Survey, SurveyNode, SurveyTree};
pub use value::CellValue;
pub use workbook::{RawRow, Workbook};
