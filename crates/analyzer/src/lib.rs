use crate::error::AnalyzerError;
use analytics::{AnalyticsEngine, Markup, PnlReport, render_report};
use configuration::AnalysisConfig;
use std::fs;
use std::path::Path;

pub mod error;
pub mod loader;

pub use loader::{LoadedTransfers, REQUIRED_COLUMNS, load_transfers};

/// The boundary between a staged transfer export and its PnL report.
///
/// An `Analyzer` holds no state besides its configuration, so one instance can
/// serve any number of concurrent calls as long as each call has its own file.
#[derive(Debug, Clone)]
pub struct Analyzer {
    engine: AnalyticsEngine,
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            engine: AnalyticsEngine::new(config.fee_threshold, config.token_filter.iter().cloned()),
        }
    }

    /// Reads, validates and analyzes the CSV export at `path`.
    ///
    /// The file is consumed: it is deleted once the report has been computed.
    /// On any error it is left in place.
    pub fn analyze(&self, path: impl AsRef<Path>) -> Result<PnlReport, AnalyzerError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AnalyzerError::FileNotFound(path.to_path_buf()));
        }

        tracing::info!(path = %path.display(), "Analyzing wallet export.");

        // 1. Load
        let loaded = load_transfers(path)?;
        if loaded.skipped_rows > 0 {
            tracing::warn!(
                path = %path.display(),
                skipped = loaded.skipped_rows,
                "Some rows could not be parsed and were skipped."
            );
        }

        // 2. Calculate
        let report = self.engine.calculate(&loaded.records, loaded.skipped_rows)?;

        // 3. Consume the input
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to delete analyzed file.");
        }

        tracing::info!(
            path = %path.display(),
            rows = loaded.records.len(),
            days = report.daily.len(),
            "Analysis completed."
        );

        Ok(report)
    }

    /// Like [`Analyzer::analyze`], but always returns text: the rendered report,
    /// or the rendered error report when the analysis fails.
    pub fn analyze_to_text(&self, path: impl AsRef<Path>, markup: &dyn Markup) -> String {
        let path = path.as_ref();
        match self.analyze(path) {
            Ok(report) => render_report(&report, markup),
            Err(e) => {
                if e.is_validation() {
                    tracing::warn!(path = %path.display(), error = %e, "Rejected wallet export.");
                } else {
                    tracing::error!(path = %path.display(), error = ?e, "Wallet analysis failed.");
                }
                e.render(markup)
            }
        }
    }
}
