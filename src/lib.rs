//! parcelbot - a Telegram bot that reports parcel tracking status.
//!
//! The crate implements a single webhook Lambda:
//! 1. Telegram delivers each chat message to the API Lambda
//! 2. The bot parses the command and, for `/track`, asks the tracking
//!    provider for the shipment, falling back through known carrier codes
//!    when autodetection finds nothing
//! 3. The accepted record is normalized into a `TrackingSummary`, rendered as
//!    Telegram HTML and sent back to the chat
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda for serverless execution
//! - reqwest for the Telegram Bot API and the tracking API
//! - tokio-retry for register/query settling and webhook setup retries
//! - chrono-tz for rendering timestamps in the configured timezone
//!
//! # Example
//!
//! ```no_run
//! use parcelbot::bot::ParcelBot;
//! use parcelbot::core::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     parcelbot::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let bot = ParcelBot::from_config(&config)?;
//!
//!     // Answer a chat message as if it had arrived through the webhook
//!     bot.handle_message(4242, "/track 5532417763").await?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod api;
pub mod bot;
pub mod core;
pub mod errors;
pub mod telegram;
pub mod tracking;
pub mod utils;

pub use errors::{NotFound, TrackerError};

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. The level comes from `RUST_LOG` and
/// defaults to `info`. Calling it more than once is harmless.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your Lambda handler
/// parcelbot::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
