//! Shared HTTP client for outbound API calls

use reqwest::Client;
use std::time::Duration;

/// Process-wide client; requests rely on its timeout rather than their own.
pub static SHARED_HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});
