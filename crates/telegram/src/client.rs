use crate::error::BotError;
use crate::types::{
    ApiResponse, File, GetFilePayload, GetUpdatesPayload, SendMessagePayload, Update,
};
use async_trait::async_trait;
use configuration::TelegramConfig;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

/// The subset of the Telegram Bot API the bot service needs.
///
/// The service only talks to this trait, so a fake implementation can stand in
/// for the real API.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Long-polls for new updates starting at `offset`.
    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>, BotError>;

    /// Sends a MarkdownV2 message to a chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError>;

    /// Resolves a `file_id` into a downloadable file.
    async fn get_file(&self, file_id: &str) -> Result<File, BotError>;

    /// Downloads a file previously resolved with `get_file` to `destination`.
    async fn download_file(&self, file_path: &str, destination: &Path) -> Result<(), BotError>;
}

/// A client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    token: String,
    api_url: String,
}

impl TelegramClient {
    /// Creates a new `TelegramClient`.
    ///
    /// Fails with `BotError::NotConfigured` if the token is missing from the configuration.
    pub fn new(config: &TelegramConfig) -> Result<Self, BotError> {
        if config.token.is_empty() {
            tracing::warn!("Telegram bot is not configured (missing token).");
            return Err(BotError::NotConfigured);
        }

        // The HTTP timeout must outlast the long-poll timeout.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 15))
            .build()?;

        Ok(Self {
            client,
            token: config.token.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<P, R>(&self, method: &str, payload: &P) -> Result<R, BotError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await
            .map_err(redact)?;

        // Error responses still carry the JSON envelope with a description.
        let body: ApiResponse<R> = response.json().await.map_err(redact)?;
        body.into_result()
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>, BotError> {
        let payload = GetUpdatesPayload {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        self.call("getUpdates", &payload).await
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        let payload = SendMessagePayload {
            chat_id,
            text,
            parse_mode: "MarkdownV2",
        };
        let _sent: serde_json::Value = self.call("sendMessage", &payload).await?;
        Ok(())
    }

    async fn get_file(&self, file_id: &str) -> Result<File, BotError> {
        self.call("getFile", &GetFilePayload { file_id }).await
    }

    async fn download_file(&self, file_path: &str, destination: &Path) -> Result<(), BotError> {
        let url = format!("{}/file/bot{}/{}", self.api_url, self.token, file_path);
        let response = self.client.get(&url).send().await.map_err(redact)?;

        if !response.status().is_success() {
            return Err(BotError::ApiError(format!(
                "file download failed with status {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await.map_err(redact)?;
        tokio::fs::write(destination, &bytes).await?;
        Ok(())
    }
}

/// Request URLs embed the bot token; keep it out of error messages and logs.
fn redact(error: reqwest::Error) -> BotError {
    BotError::Request(error.without_url())
}
