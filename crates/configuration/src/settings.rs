use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub telegram: TelegramConfig,
    pub logging: LoggingConfig,
}

/// Parameters for the PnL analysis of a transfer export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Outflows at or below this value are classified as fees.
    pub fee_threshold: Decimal,
    /// Only rows whose `TokenAddress` is one of these identifiers are analyzed.
    /// Add "So11111111111111111111111111111111111111112" to include wrapped SOL.
    pub token_filter: Vec<String>,
}

/// Credentials and behaviour of the Telegram front end.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: String,
    /// Where uploaded CSV files are staged before analysis.
    pub upload_dir: PathBuf,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---
// These allow every section (or the whole file) to be omitted.

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fee_threshold: dec!(1),
            token_filter: vec!["SOL".to_string()],
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            upload_dir: PathBuf::from("uploads"),
            poll_timeout_secs: 30,
            api_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
