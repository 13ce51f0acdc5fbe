use async_trait::async_trait;

use crate::errors::TrackerError;

/// Outbound side of the chat platform.
///
/// Implementations report pass/fail only; callers never retry a failed send.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// # Errors
    ///
    /// Returns `TrackerError::DeliveryError` (or a transport error) when the
    /// platform did not accept the message.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TrackerError>;
}
