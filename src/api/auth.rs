use serde_json::Value;
use tracing::error;

use super::parsing::get_header_value;
use crate::core::config::AppConfig;

pub const SECRET_TOKEN_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Checks the secret Telegram echoes back on every webhook call.
///
/// Always passes when no `TELEGRAM_WEBHOOK_SECRET` is configured.
pub fn verify_secret_token(headers: &Value, config: &AppConfig) -> bool {
    let Some(expected) = config.telegram_webhook_secret.as_deref() else {
        return true;
    };

    match get_header_value(headers, SECRET_TOKEN_HEADER) {
        Some(received) if received == expected => true,
        Some(_) => {
            error!("Webhook secret token mismatch");
            false
        }
        None => {
            error!("Missing {} header", SECRET_TOKEN_HEADER);
            false
        }
    }
}
