//! API Lambda handler for the Telegram webhook.
//!
//! This module handles:
//! - Request validation (headers, body, secret token)
//! - Parsing the Telegram update
//! - Dispatching text messages to the bot pipeline
//!
//! Telegram redelivers updates that are not acknowledged with a 2xx, so every
//! well-formed update is answered with 200 even when the lookup or the reply
//! failed.

use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use super::{auth, helpers, parsing};
use crate::bot::ParcelBot;
use crate::core::config::AppConfig;
use crate::core::delivery::MessageChannel;
use crate::telegram::update::parse_update;
use crate::tracking::provider::TrackingProvider;

pub use self::function_handler as handler;

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never fails in practice: configuration problems are answered with a 500
/// response so they show up in the API Gateway logs.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<impl Serialize, Error> {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Config error: {}", e);
            return Ok(helpers::err_response(500, "Server configuration error"));
        }
    };

    Ok(handle_request(&config, &event.payload).await)
}

/// Validates the request and answers it with the production bot.
pub async fn handle_request(config: &AppConfig, payload: &Value) -> Value {
    let bot = match ParcelBot::from_config(config) {
        Ok(bot) => bot,
        Err(e) => {
            error!("Failed to initialize bot: {}", e);
            return helpers::err_response(500, "Bot initialization failed");
        }
    };

    handle_request_with(&bot, config, payload).await
}

/// Request handling against an already constructed bot.
pub async fn handle_request_with<P, C>(
    bot: &ParcelBot<P, C>,
    config: &AppConfig,
    payload: &Value,
) -> Value
where
    P: TrackingProvider,
    C: MessageChannel,
{
    // ========================================================================
    // Extract and validate headers
    // ========================================================================

    let Some(headers) = payload.get("headers") else {
        error!("Request missing headers");
        return helpers::err_response(400, "Missing headers");
    };

    if !auth::verify_secret_token(headers, config) {
        return helpers::err_response(401, "Invalid secret token");
    }

    // ========================================================================
    // Parse the update
    // ========================================================================

    let body = match parsing::extract_body(payload) {
        Ok(body) => body,
        Err(e) => {
            error!("Invalid request body: {}", e);
            return helpers::err_response(400, &e.to_string());
        }
    };

    let update = match parse_update(&body) {
        Ok(update) => update,
        Err(e) => {
            error!("{}", e);
            return helpers::err_response(400, &e.to_string());
        }
    };

    let update_id = update.update_id;
    let Some(message) = update.into_inbound() else {
        info!(update_id, "Ignoring update without text message");
        return helpers::ok_empty();
    };

    // ========================================================================
    // Dispatch
    // ========================================================================

    let correlation_id = Uuid::new_v4().to_string();
    info!(
        update_id,
        chat_id = message.chat_id,
        correlation_id = %correlation_id,
        "Dispatching message"
    );

    if let Err(e) = bot.handle_message(message.chat_id, &message.text).await {
        error!(correlation_id = %correlation_id, "Reply not delivered: {}", e);
    }

    helpers::ok_empty()
}
