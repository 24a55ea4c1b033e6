use analytics::{AnalyticsError, Markup, render_error};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("wallet analysis file missing")]
    FileNotFound(PathBuf),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error while reading the export: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Calculation(#[from] AnalyticsError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AnalyzerError {
    /// Errors caused by the input itself rather than by a failure while processing it.
    pub fn is_validation(&self) -> bool {
        matches!(self, AnalyzerError::FileNotFound(_) | AnalyzerError::MissingColumns(_))
    }

    /// The user-facing error report for this error.
    pub fn render(&self, markup: &dyn Markup) -> String {
        let title = if self.is_validation() { "Error" } else { "Error analyzing file" };
        render_error(title, &self.to_string(), markup)
    }
}
