use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{AnalysisConfig, Config, LoggingConfig, TelegramConfig};

/// Prefix of the environment variables that override file settings,
/// e.g. `SOLPNL__ANALYSIS__FEE_THRESHOLD=0.5`.
pub const ENV_PREFIX: &str = "SOLPNL";

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. The file is optional;
/// every missing key falls back to its default.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Loads the configuration, layering (lowest to highest precedence) built-in defaults,
/// the TOML file at `path` if it exists, `SOLPNL__*` variables and the `BOT_TOKEN` variable.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("analysis.token_filter"),
        )
        .set_override_option("telegram.token", std::env::var("BOT_TOKEN").ok())?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.fee_threshold.is_sign_negative() && !self.analysis.fee_threshold.is_zero() {
            return Err(ConfigError::ValidationError(format!(
                "analysis.fee_threshold must not be negative (got {})",
                self.analysis.fee_threshold
            )));
        }
        if self.analysis.token_filter.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "analysis.token_filter must name at least one token".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert_eq!(config.analysis.fee_threshold, dec!(1));
        assert_eq!(config.analysis.token_filter, vec!["SOL".to_string()]);
        assert_eq!(config.telegram.poll_timeout_secs, 30);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[analysis]\nfee_threshold = 0.25\ntoken_filter = [\"SOL\", \"WSOL\"]\n\n[telegram]\nupload_dir = \"/tmp/solpnl\""
        )
        .unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.analysis.fee_threshold, dec!(0.25));
        assert_eq!(config.analysis.token_filter, vec!["SOL".to_string(), "WSOL".to_string()]);
        assert_eq!(config.telegram.upload_dir, std::path::PathBuf::from("/tmp/solpnl"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn validation_rejects_bad_analysis_settings() {
        let mut config = Config::default();
        config.analysis.fee_threshold = dec!(-0.1);
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = Config::default();
        config.analysis.token_filter.clear();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }
}
