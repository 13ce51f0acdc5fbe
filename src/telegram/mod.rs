//! All Telegram-specific functionality

pub mod client;
pub mod command_parser;
pub mod message_formatter;
pub mod update;

// Re-export main types for convenience
pub use client::TelegramClient;
pub use command_parser::parse_command;
pub use update::{InboundMessage, Update, parse_update};
