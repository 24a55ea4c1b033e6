use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Telegram API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Telegram API returned an error: {0}")]
    ApiError(String),

    #[error("Bot is not configured. Missing token.")]
    NotConfigured,

    #[error("Failed to stage uploaded file: {0}")]
    Io(#[from] std::io::Error),
}
