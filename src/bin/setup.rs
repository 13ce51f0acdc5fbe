//! One-off webhook registration.
//!
//! Reads the bot configuration plus `WEBHOOK_URL` from the environment, points
//! the Telegram webhook at it and prints what Telegram reports back.

use anyhow::{Context, Result, anyhow};
use parcelbot::core::config::AppConfig;
use parcelbot::telegram::TelegramClient;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    parcelbot::setup_logging();

    let config = AppConfig::from_env().map_err(|e| anyhow!("Config error: {e}"))?;
    let webhook_url = std::env::var("WEBHOOK_URL").context("WEBHOOK_URL must be set")?;

    let client = TelegramClient::new(&config.telegram_bot_token, &config.telegram_api_base_url)?;
    client
        .set_webhook(&webhook_url, config.telegram_webhook_secret.as_deref())
        .await
        .context("setWebhook failed")?;

    let info = client
        .get_webhook_info()
        .await
        .context("getWebhookInfo failed")?;
    info!(webhook_info = %info, "Webhook configured");
    println!("{}", serde_json::to_string_pretty(&info)?);

    Ok(())
}
