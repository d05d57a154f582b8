//! Error types for the planner library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the planner library
#[derive(Error, Debug)]
pub enum Error {
    /// Year outside the supported calendar range
    #[error("Invalid year {0}: supported years are {min}..={max}", min = crate::calendar::MIN_YEAR, max = crate::calendar::MAX_YEAR)]
    InvalidYear(i32),

    /// The template catalog has no template with this id
    #[error("Missing template: {0}")]
    MissingTemplate(String),

    /// Page unit does not exist in the computed calendar
    #[error("Page unit not in calendar: {0}")]
    UnknownUnit(String),

    /// Imposition invariant violated (indicates a bug or a bad signature size)
    #[error("Imposition error: {0}")]
    Imposition(String),

    /// External converter failed for one page
    #[error("Rendering page {page_index} failed: {message}")]
    Render { page_index: usize, message: String },

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// PDF structure not as expected
    #[error("Malformed PDF: {0}")]
    MalformedPdf(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Template directory missing or not a directory
    #[error("Template directory not found: {}", .0.display())]
    TemplateDirectory(PathBuf),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Unknown week-start name
    #[error("Invalid week start: {0} (expected monday or sunday)")]
    InvalidWeekStart(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
