use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shortest tracking number accepted before a lookup is attempted.
pub const MIN_TRACKING_NUMBER_LEN: usize = 8;

/// Maximum number of events kept in a summary's history.
pub const MAX_HISTORY_EVENTS: usize = 5;

pub const UNKNOWN_STATUS: &str = "Unknown";
pub const UNKNOWN_LOCATION: &str = "Unknown";
pub const UNKNOWN_CARRIER: &str = "Unknown carrier";

/// Normalized inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Track(TrackingQuery),
    Unrecognized,
}

/// Carrier identifiers understood by the tracking provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarrierHint {
    /// Air-express network.
    DhlExpress,
    /// Postal network variant.
    DhlPaket,
    /// Regional supply-chain variant.
    DhlSupplyChainApac,
}

impl CarrierHint {
    pub const ALL: [CarrierHint; 3] = [
        CarrierHint::DhlExpress,
        CarrierHint::DhlPaket,
        CarrierHint::DhlSupplyChainApac,
    ];

    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            CarrierHint::DhlExpress => 100_001,
            CarrierHint::DhlPaket => 7_041,
            CarrierHint::DhlSupplyChainApac => 100_765,
        }
    }

    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|hint| hint.code() == code)
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            CarrierHint::DhlExpress => "DHL Express",
            CarrierHint::DhlPaket => "DHL Paket",
            CarrierHint::DhlSupplyChainApac => "DHL Supply Chain APAC",
        }
    }
}

impl fmt::Display for CarrierHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for CarrierHint {
    type Err = String;

    /// Accepts a numeric provider code or a case-insensitive name such as
    /// `dhl-express` or `DHL Paket`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u32>() {
            return Self::from_code(code).ok_or_else(|| format!("unknown carrier code {code}"));
        }

        let key: String = trimmed
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "dhlexpress" | "dhl" => Ok(CarrierHint::DhlExpress),
            "dhlpaket" | "dhlpost" => Ok(CarrierHint::DhlPaket),
            "dhlsupplychainapac" | "dhlsupplychain" => Ok(CarrierHint::DhlSupplyChainApac),
            _ => Err(format!("unknown carrier '{trimmed}'")),
        }
    }
}

/// A single lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingQuery {
    number: String,
    carrier: Option<CarrierHint>,
}

impl TrackingQuery {
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            carrier: None,
        }
    }

    #[must_use]
    pub fn with_carrier(number: impl Into<String>, carrier: CarrierHint) -> Self {
        Self {
            number: number.into(),
            carrier: Some(carrier),
        }
    }

    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    #[must_use]
    pub fn carrier(&self) -> Option<CarrierHint> {
        self.carrier
    }
}

/// How much of a summary could be extracted from the raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SummaryDetail {
    Full,
    NoEventsYet,
    Unparsed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Canonical shipment status handed to rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingSummary {
    pub tracking_number: String,
    pub carrier: String,
    pub status: String,
    pub location: String,
    pub last_update: Option<String>,
    pub description: Option<String>,
    pub estimated_delivery: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub carrier_contact: Option<String>,
    pub detail: SummaryDetail,
}

impl TrackingSummary {
    /// Summary for a resolved shipment that has no scan events yet.
    #[must_use]
    pub fn no_events(tracking_number: &str, carrier: String) -> Self {
        Self {
            tracking_number: tracking_number.to_string(),
            carrier,
            status: UNKNOWN_STATUS.to_string(),
            location: UNKNOWN_LOCATION.to_string(),
            last_update: None,
            description: None,
            estimated_delivery: None,
            history: Vec::new(),
            carrier_contact: None,
            detail: SummaryDetail::NoEventsYet,
        }
    }

    /// Summary used when the record was accepted but its details could not be read.
    #[must_use]
    pub fn unparsed(tracking_number: &str, carrier: String) -> Self {
        Self {
            detail: SummaryDetail::Unparsed,
            ..Self::no_events(tracking_number, carrier)
        }
    }
}
