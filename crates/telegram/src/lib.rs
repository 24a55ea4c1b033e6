//! # Telegram front end
//!
//! Receives CSV exports as Telegram documents, runs them through the
//! [`analyzer::Analyzer`] and replies with the report rendered as MarkdownV2.

pub mod client;
pub mod error;
pub mod markdown;
pub mod service;
pub mod types;

pub use client::{BotApi, TelegramClient};
pub use error::BotError;
pub use markdown::{MAX_MESSAGE_LEN, MarkdownV2, escape_markdown, split_message};
pub use service::BotService;
