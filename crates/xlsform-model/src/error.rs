use thiserror::Error;

/// Fatal compilation errors. Warnings go through
/// [`crate::Diagnostics`] instead and never abort compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An error attributable to a specific survey sheet row. Row numbers
    /// are 1-indexed with the column header row counted as row 1, so the
    /// first data row is row 2.
    #[error("[row : {row}] {message}")]
    Row { row: u32, message: String },
    /// A malformed `parameters` column value.
    #[error("{0}")]
    Parameter(String),
    /// Any other fatal condition (missing sheets, bad choice lists, ...).
    #[error("{0}")]
    Message(String),
}

impl CompileError {
    pub fn row(row: u32, message: impl Into<String>) -> Self {
        CompileError::Row {
            row,
            message: message.into(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        CompileError::Message(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
