use analytics::{PlainText, PnlReport, render_report};
use analyzer::Analyzer;
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use telegram::{BotService, TelegramClient};

/// The main entry point for the wallet PnL tool.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse command-line arguments first so --help and --version never need a valid config.
    let cli = Cli::parse();

    // Load environment variables (BOT_TOKEN, SOLPNL__*) from a .env file, if any.
    dotenvy::dotenv().ok();

    let config = configuration::load_config().context("Failed to load configuration")?;
    let _log_guard = configuration::init_tracing(&config.logging).context("Failed to initialise logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &config.analysis),
        Commands::Bot => {
            handle_bot(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Profit-and-loss reports for Solana wallet transfer exports.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a CSV export and print the PnL report. The file is deleted afterwards.
    Analyze(AnalyzeArgs),
    /// Run the Telegram bot until interrupted.
    Bot,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Path to the CSV export (columns: Time, Flow, Value, TokenAddress).
    file: PathBuf,

    /// Analyze a private copy so the original file is kept.
    #[arg(long)]
    keep: bool,

    /// Also print the daily breakdown as a table.
    #[arg(long)]
    table: bool,
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

/// Prints the report, or the rendered error and a failing exit code.
fn handle_analyze(args: AnalyzeArgs, config: &configuration::AnalysisConfig) -> anyhow::Result<ExitCode> {
    let analyzer = Analyzer::new(config);

    let target = if args.keep {
        stage_copy(&args.file)?
    } else {
        args.file.clone()
    };

    match analyzer.analyze(&target) {
        Ok(report) => {
            println!("{}", render_report(&report, &PlainText));
            if args.table {
                println!("\n{}", daily_table(&report));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", e.render(&PlainText));
            tracing::debug!(file = %args.file.display(), error = ?e, "Analysis failed.");
            if args.keep {
                // The copy is ours; the original is untouched either way.
                let _ = std::fs::remove_file(&target);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Copies `file` next to itself under a unique name, since analysis consumes its input.
fn stage_copy(file: &Path) -> anyhow::Result<PathBuf> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export.csv".to_string());
    let copy = file.with_file_name(format!(".{}_{}", uuid::Uuid::new_v4(), name));
    std::fs::copy(file, &copy)
        .with_context(|| format!("Failed to copy {} before analysis", file.display()))?;
    Ok(copy)
}

fn daily_table(report: &PnlReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Date", "Inflow", "Outflow", "PnL with fees", "PnL without fees", "Total fees",
    ]);

    let amount = |value: Decimal| Cell::new(analytics::render::format_amount(value)).set_alignment(CellAlignment::Right);
    for day in &report.daily {
        table.add_row(vec![
            Cell::new(day.date),
            amount(day.inflow),
            amount(day.outflow),
            amount(day.pnl),
            amount(day.pnl_excluding_fees),
            amount(day.fees),
        ]);
    }
    table
}

// ==============================================================================
// Bot Command Logic
// ==============================================================================

async fn handle_bot(config: &configuration::Config) -> anyhow::Result<()> {
    let client = TelegramClient::new(&config.telegram)
        .context("Set BOT_TOKEN or telegram.token to run the bot")?;
    let service = BotService::new(
        Arc::new(client),
        Analyzer::new(&config.analysis),
        &config.telegram,
    );

    tracing::info!("🚀 Starting Telegram bot...");
    service
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
            }
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn keep_analyzes_a_copy() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("wallet.csv");
        fs::write(&original, "Time,Flow,Value,TokenAddress\n1700000000,in,1,SOL\n").unwrap();

        let copy = stage_copy(&original).unwrap();
        assert_ne!(copy, original);
        assert_eq!(copy.parent(), original.parent());

        Analyzer::new(&configuration::AnalysisConfig::default()).analyze(&copy).unwrap();
        assert!(original.exists());
        assert!(!copy.exists());
    }

    #[test]
    fn daily_table_has_a_row_per_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.csv");
        fs::write(
            &path,
            "Time,Flow,Value,TokenAddress\n1700000000,in,1,SOL\n1700086400,out,0.5,SOL\n",
        )
        .unwrap();

        let report = Analyzer::new(&configuration::AnalysisConfig::default()).analyze(&path).unwrap();
        let rendered = daily_table(&report).to_string();
        assert!(rendered.contains("2023-11-14"));
        assert!(rendered.contains("2023-11-15"));
        assert!(rendered.contains("0.500000$"));
    }

    #[test]
    fn cli_parses_analyze_flags() {
        let cli = Cli::try_parse_from(["solpnl", "analyze", "export.csv", "--keep", "--table"]).unwrap();
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.file, PathBuf::from("export.csv"));
                assert!(args.keep && args.table);
            }
            Commands::Bot => panic!("expected analyze"),
        }
    }

    #[test]
    fn failed_analysis_exits_with_failure_and_cleans_up_the_copy() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("wallet.csv");
        fs::write(&original, "Time,Flow,Value\n1700000000,in,1\n").unwrap();

        let args = AnalyzeArgs {
            file: original.clone(),
            keep: true,
            table: false,
        };
        let code = handle_analyze(args, &configuration::AnalysisConfig::default()).unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(original.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_file_is_a_failure_not_an_error() {
        let args = AnalyzeArgs {
            file: PathBuf::from("/nonexistent/wallet.csv"),
            keep: false,
            table: false,
        };
        let code = handle_analyze(args, &configuration::AnalysisConfig::default()).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }
}
