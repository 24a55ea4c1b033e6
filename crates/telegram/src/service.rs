use crate::client::BotApi;
use crate::error::BotError;
use crate::markdown::{MAX_MESSAGE_LEN, MarkdownV2, split_message};
use crate::types::{Document, Message};
use analytics::{Markup, render_error};
use analyzer::Analyzer;
use analyzer::error::AnalyzerError;
use configuration::TelegramConfig;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use uuid::Uuid;

pub const GREETING: &str = "👋 Hello! I am a bot for analyzing Solana wallets.\n\n\
🔹 Send me a CSV file, and I will provide you with a PnL analysis for the last 1000 transactions.";

pub const NOT_CSV: &str = "❌ Please send a CSV file";

/// Pause after a failed poll before trying again.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// What the bot should do with an incoming message.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Upload(UploadRequest),
    Ignore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub file_id: String,
    /// `None` or a non-CSV name gets the upload rejected.
    pub file_name: Option<String>,
}

impl From<&Document> for UploadRequest {
    fn from(document: &Document) -> Self {
        Self {
            file_id: document.file_id.clone(),
            file_name: document.file_name.clone(),
        }
    }
}

pub fn classify(message: &Message) -> Command {
    if let Some(document) = &message.document {
        return Command::Upload(document.into());
    }
    match message.text.as_deref().and_then(|t| t.split_whitespace().next()) {
        // "/start@SomeBot" is what group chats send.
        Some(command) if command == "/start" || command.starts_with("/start@") => Command::Start,
        _ => Command::Ignore,
    }
}

pub fn is_csv(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".csv")
}

/// A unique, sanitized location for an upload inside `upload_dir`.
///
/// Concurrent uploads of files with the same name never collide.
pub fn staged_path(upload_dir: &Path, file_name: &str) -> PathBuf {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.csv");
    let safe: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    upload_dir.join(format!("{}_{}", Uuid::new_v4(), safe))
}

fn analyzing_notice(file_name: &str) -> String {
    let markup = MarkdownV2;
    format!(
        "{}{}{}",
        markup.escape("🔄 Analyzing file "),
        markup.code(file_name),
        markup.escape(", please wait...")
    )
}

fn log_task_failure(finished: Result<(), tokio::task::JoinError>) {
    if let Err(e) = finished {
        tracing::error!(error = %e, "Message task panicked.");
    }
}

/// A long-running service that polls Telegram for uploads and answers each
/// CSV export with its PnL report.
#[derive(Clone)]
pub struct BotService {
    api: Arc<dyn BotApi>,
    analyzer: Arc<Analyzer>,
    upload_dir: PathBuf,
    poll_timeout_secs: u64,
}

impl BotService {
    pub fn new(api: Arc<dyn BotApi>, analyzer: Analyzer, config: &TelegramConfig) -> Self {
        Self {
            api,
            analyzer: Arc::new(analyzer),
            upload_dir: config.upload_dir.clone(),
            poll_timeout_secs: config.poll_timeout_secs,
        }
    }

    /// Polls for updates until `shutdown` completes. Each message is handled on its own
    /// task; uploads still in flight at shutdown are finished before this returns.
    pub async fn run<F>(self, shutdown: F) -> Result<(), BotError>
    where
        F: Future<Output = ()>,
    {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tracing::info!(upload_dir = %self.upload_dir.display(), "Bot service started. Waiting for uploads.");

        tokio::pin!(shutdown);
        let mut offset: Option<i64> = None;
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested. Bot service stopping.");
                    break;
                }
                result = self.api.get_updates(offset, self.poll_timeout_secs) => match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = Some(update.update_id + 1);
                            let Some(message) = update.message else { continue };
                            let service = self.clone();
                            tasks.spawn(async move {
                                let chat_id = message.chat.id;
                                if let Err(e) = service.handle_message(message).await {
                                    tracing::error!(chat_id, error = ?e, "Failed to handle message.");
                                }
                            });
                        }
                        while let Some(finished) = tasks.try_join_next() {
                            log_task_failure(finished);
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "Failed to poll Telegram for updates.");
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                },
            }
        }

        if !tasks.is_empty() {
            tracing::info!(pending = tasks.len(), "Waiting for in-flight messages to finish.");
        }
        while let Some(finished) = tasks.join_next().await {
            log_task_failure(finished);
        }

        Ok(())
    }

    pub async fn handle_message(&self, message: Message) -> Result<(), BotError> {
        let chat_id = message.chat.id;
        match classify(&message) {
            Command::Start => {
                self.api.send_message(chat_id, &MarkdownV2.escape(GREETING)).await
            }
            Command::Upload(request) => self.handle_upload(chat_id, request).await,
            Command::Ignore => Ok(()),
        }
    }

    async fn handle_upload(&self, chat_id: i64, request: UploadRequest) -> Result<(), BotError> {
        let Some(file_name) = request.file_name.as_deref().filter(|name| is_csv(name)) else {
            return self.api.send_message(chat_id, &MarkdownV2.escape(NOT_CSV)).await;
        };

        let staged = staged_path(&self.upload_dir, file_name);
        if let Err(e) = self.stage(&request.file_id, &staged).await {
            tracing::error!(chat_id, file_name, error = ?e, "Failed to download upload.");
            // Drop whatever part of the download made it to disk.
            let _ = tokio::fs::remove_file(&staged).await;
            let reply = render_error("Error analyzing file", "could not download the file", &MarkdownV2);
            self.api.send_message(chat_id, &reply).await?;
            return Err(e);
        }

        tracing::info!(chat_id, file_name, staged = %staged.display(), "Upload staged.");
        self.api.send_message(chat_id, &analyzing_notice(file_name)).await?;

        let analyzer = Arc::clone(&self.analyzer);
        let path = staged.clone();
        let reply = match tokio::task::spawn_blocking(move || analyzer.analyze_to_text(&path, &MarkdownV2)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(chat_id, error = %e, "Analysis task panicked.");
                AnalyzerError::Unexpected(e.to_string()).render(&MarkdownV2)
            }
        };

        for part in split_message(&reply, MAX_MESSAGE_LEN) {
            if let Err(e) = self.api.send_message(chat_id, &part).await {
                tracing::error!(chat_id, error = ?e, "Failed to send the report.");
                let notice = render_error("Error analyzing file", "could not send the report", &MarkdownV2);
                self.api.send_message(chat_id, &notice).await?;
                return Err(e);
            }
        }
        Ok(())
    }

    async fn stage(&self, file_id: &str, destination: &Path) -> Result<(), BotError> {
        let file = self.api.get_file(file_id).await?;
        let remote_path = file
            .file_path
            .ok_or_else(|| BotError::ApiError("getFile returned no file_path".to_string()))?;
        self.api.download_file(&remote_path, destination).await
    }
}
