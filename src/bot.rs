//! Command handling pipeline.
//!
//! `ParcelBot` turns one inbound chat message into one reply: static texts
//! for `/start` and `/help`, or a tracking lookup for `/track`. Lookups run
//! resolve → normalize → render and the reply goes out through a
//! [`MessageChannel`].

use chrono_tz::Tz;
use tracing::{error, info, warn};

use crate::core::config::AppConfig;
use crate::core::delivery::MessageChannel;
use crate::core::models::{Command, MIN_TRACKING_NUMBER_LEN, TrackingQuery};
use crate::errors::{NotFound, TrackerError};
use crate::telegram::TelegramClient;
use crate::telegram::command_parser::parse_command;
use crate::telegram::message_formatter::{
    format_invalid_number_message, format_not_found_message, format_summary_message,
};
use crate::tracking::normalizer::normalize;
use crate::tracking::provider::{TrackingApiClient, TrackingProvider};
use crate::tracking::resolver::{CarrierResolver, ResolverConfig};

pub const START_MESSAGE: &str = "Hi! Send me a tracking number and I will look up where your parcel is.\n\nUse <code>/track NUMBER</code> or just paste the number. Type /help for more.";

pub const HELP_MESSAGE: &str = "<b>Commands</b>\n/track NUMBER [CARRIER] - show the current status of a shipment; CARRIER is one of dhl-express, dhl-paket, dhl-supply-chain\n/help - show this message\n\nYou can also paste a tracking number on its own. New numbers can take a few minutes to show up at the carrier.";

pub const UNRECOGNIZED_MESSAGE: &str =
    "Sorry, I did not understand that. Send /help to see what I can do.";

/// Shown whenever configuration or delivery fails.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, please try again.";

/// Checks a tracking number before any lookup is attempted.
///
/// # Errors
///
/// Returns the user-facing explanation when the number is too short.
pub fn validate_tracking_number(number: &str) -> Result<(), String> {
    if number.chars().count() < MIN_TRACKING_NUMBER_LEN {
        return Err(format_invalid_number_message(MIN_TRACKING_NUMBER_LEN));
    }
    Ok(())
}

pub struct ParcelBot<P, C> {
    /// `None` when the tracking API key is missing; lookups then fail fast.
    resolver: Option<CarrierResolver<P>>,
    channel: C,
    timezone: Tz,
}

impl ParcelBot<TrackingApiClient, TelegramClient> {
    /// Builds the production bot from configuration.
    ///
    /// A missing tracking API key is not an error here: the bot still answers
    /// `/start` and `/help`, and reports the problem on `/track`.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::ConfigError` if a configured base URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, TrackerError> {
        let channel =
            TelegramClient::new(&config.telegram_bot_token, &config.telegram_api_base_url)?;

        let resolver = match config.require_tracking_api_key() {
            Ok(key) => {
                let provider = TrackingApiClient::new(key, &config.tracking_api_base_url)?;
                Some(CarrierResolver::new(
                    provider,
                    ResolverConfig::from_app_config(config),
                ))
            }
            Err(e) => {
                warn!("Tracking lookups disabled: {}", e);
                None
            }
        };

        Ok(Self::new(resolver, channel, config.display_timezone))
    }
}

impl<P: TrackingProvider, C: MessageChannel> ParcelBot<P, C> {
    #[must_use]
    pub fn new(resolver: Option<CarrierResolver<P>>, channel: C, timezone: Tz) -> Self {
        Self {
            resolver,
            channel,
            timezone,
        }
    }

    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    #[must_use]
    pub fn resolver(&self) -> Option<&CarrierResolver<P>> {
        self.resolver.as_ref()
    }

    /// Reply text for a command.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::ConfigError` for a lookup when no tracking API
    /// key is configured. No provider call is made in that case.
    pub async fn reply_for(&self, command: &Command) -> Result<String, TrackerError> {
        match command {
            Command::Start => Ok(START_MESSAGE.to_string()),
            Command::Help => Ok(HELP_MESSAGE.to_string()),
            Command::Unrecognized => Ok(UNRECOGNIZED_MESSAGE.to_string()),
            Command::Track(query) => {
                if let Err(message) = validate_tracking_number(query.number()) {
                    return Ok(message);
                }
                self.track(query).await
            }
        }
    }

    async fn track(&self, query: &TrackingQuery) -> Result<String, TrackerError> {
        let resolver = self.resolver.as_ref().ok_or_else(|| {
            TrackerError::ConfigError("TRACKING_API_KEY is not set".to_string())
        })?;

        let number = query.number();
        match resolver.resolve(query).await {
            Ok(record) => {
                let summary = normalize(number, &record, self.timezone);
                info!(
                    tracking_number = number,
                    carrier = %summary.carrier,
                    status = %summary.status,
                    "Tracking summary ready"
                );
                Ok(format_summary_message(&summary))
            }
            Err(NotFound) => Ok(format_not_found_message(number)),
        }
    }

    /// Answers one inbound message.
    ///
    /// # Errors
    ///
    /// Returns the delivery error when the reply could not be sent. A single
    /// apology message is attempted in that case; the reply itself is never
    /// re-sent.
    #[tracing::instrument(level = "info", skip(self, text))]
    pub async fn handle_message(&self, chat_id: i64, text: &str) -> Result<(), TrackerError> {
        let command = parse_command(text);
        info!(command = ?command, "Handling command");

        let reply = match self.reply_for(&command).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Failed to build reply: {}", e);
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        };

        if let Err(e) = self.channel.send_message(chat_id, &reply).await {
            error!("Failed to deliver reply: {}", e);
            if reply != GENERIC_FAILURE_MESSAGE
                && let Err(apology_err) = self
                    .channel
                    .send_message(chat_id, GENERIC_FAILURE_MESSAGE)
                    .await
            {
                warn!("Failed to deliver failure notice: {}", apology_err);
            }
            return Err(e);
        }

        Ok(())
    }
}
