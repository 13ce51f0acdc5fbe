//! Response normalization.
//!
//! Accepted records come in two generations that the provider does not label:
//!
//! - the extended layout carries a `track_info` object with separate
//!   `latest_status`, `latest_event`, `time_metrics` and `tracking.providers`
//!   sections;
//! - the legacy layout carries a `track` object whose event list `z1` holds
//!   compact single-letter fields (`a` time, `c` location, `z` detail,
//!   `s` status), newest first.
//!
//! [`RawShape::classify`] turns a record into one of these variants once, and
//! [`normalize`] projects the variant onto a [`TrackingSummary`]. Any failure
//! along the way degrades to [`TrackingSummary::unparsed`].

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::provider::RawLookupResult;
use super::status::{translate_legacy_status, translate_status};
use crate::core::models::{
    CarrierHint, HistoryEntry, MAX_HISTORY_EVENTS, SummaryDetail, TrackingSummary,
    UNKNOWN_CARRIER, UNKNOWN_LOCATION, UNKNOWN_STATUS,
};
use crate::utils::time::format_timestamp;

#[derive(Debug, Error)]
pub(crate) enum NormalizeError {
    #[error("malformed track_info section: {0}")]
    Extended(serde_json::Error),

    #[error("malformed track section: {0}")]
    Legacy(serde_json::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Extended layout
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ExtendedTrack {
    #[serde(default)]
    latest_status: Option<LatestStatus>,
    #[serde(default)]
    latest_event: Option<ExtendedEvent>,
    #[serde(default)]
    time_metrics: Option<TimeMetrics>,
    #[serde(default)]
    tracking: Option<TrackingSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LatestStatus {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ExtendedEvent {
    #[serde(default)]
    time_iso: Option<String>,
    #[serde(default)]
    time_utc: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TimeMetrics {
    #[serde(default)]
    estimated_delivery_date: Option<DeliveryWindow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DeliveryWindow {
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TrackingSection {
    #[serde(default)]
    providers: Option<Vec<ProviderSection>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProviderSection {
    #[serde(default)]
    provider: Option<ProviderDescriptor>,
    #[serde(default)]
    events: Option<Vec<ExtendedEvent>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProviderDescriptor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tel: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
}

impl ExtendedEvent {
    fn is_blank(&self) -> bool {
        [
            &self.time_iso,
            &self.time_utc,
            &self.description,
            &self.location,
        ]
        .iter()
        .all(|field| non_empty(field.as_deref()).is_none())
    }

    fn timestamp(&self) -> Option<&str> {
        non_empty(self.time_iso.as_deref()).or_else(|| non_empty(self.time_utc.as_deref()))
    }

    fn to_history(&self, tz: Tz) -> HistoryEntry {
        HistoryEntry {
            timestamp: self.timestamp().map(|ts| format_timestamp(ts, tz)),
            location: non_empty(self.location.as_deref()).map(str::to_string),
            description: non_empty(self.description.as_deref()).map(str::to_string),
        }
    }
}

impl ExtendedTrack {
    fn primary_provider(&self) -> Option<&ProviderSection> {
        self.tracking
            .as_ref()
            .and_then(|t| t.providers.as_deref())
            .and_then(<[ProviderSection]>::first)
    }

    fn events(&self) -> &[ExtendedEvent] {
        self.primary_provider()
            .and_then(|p| p.events.as_deref())
            .unwrap_or_default()
    }

    fn carrier_name(&self) -> Option<&str> {
        self.primary_provider()
            .and_then(|p| p.provider.as_ref())
            .and_then(|d| non_empty(d.name.as_deref()))
    }

    fn carrier_contact(&self) -> Option<String> {
        let descriptor = self.primary_provider()?.provider.as_ref()?;
        non_empty(descriptor.tel.as_deref())
            .or_else(|| non_empty(descriptor.homepage.as_deref()))
            .map(str::to_string)
    }

    fn estimated_delivery(&self, tz: Tz) -> Option<String> {
        let window = self.time_metrics.as_ref()?.estimated_delivery_date.as_ref()?;
        let from = non_empty(window.from.as_deref()).map(|ts| format_timestamp(ts, tz));
        let to = non_empty(window.to.as_deref()).map(|ts| format_timestamp(ts, tz));

        match (from, to) {
            (Some(from), Some(to)) if from == to => Some(from),
            (Some(from), Some(to)) => Some(format!("{from} - {to}")),
            (Some(single), None) | (None, Some(single)) => Some(single),
            (None, None) => None,
        }
    }

    fn summarize(
        &self,
        tracking_number: &str,
        fallback_carrier: String,
        tz: Tz,
    ) -> TrackingSummary {
        let carrier = self.carrier_name().map_or(fallback_carrier, str::to_string);
        let events = self.events();
        let latest = self
            .latest_event
            .as_ref()
            .filter(|e| !e.is_blank())
            .or_else(|| events.first().filter(|e| !e.is_blank()));

        let Some(latest) = latest else {
            return TrackingSummary {
                estimated_delivery: self.estimated_delivery(tz),
                carrier_contact: self.carrier_contact(),
                ..TrackingSummary::no_events(tracking_number, carrier)
            };
        };

        let status = self
            .latest_status
            .as_ref()
            .and_then(|s| non_empty(s.status.as_deref()))
            .map_or_else(|| UNKNOWN_STATUS.to_string(), translate_status);

        TrackingSummary {
            tracking_number: tracking_number.to_string(),
            carrier,
            status,
            location: non_empty(latest.location.as_deref())
                .unwrap_or(UNKNOWN_LOCATION)
                .to_string(),
            last_update: latest.timestamp().map(|ts| format_timestamp(ts, tz)),
            description: non_empty(latest.description.as_deref()).map(str::to_string),
            estimated_delivery: self.estimated_delivery(tz),
            history: if events.is_empty() {
                vec![latest.to_history(tz)]
            } else {
                events
                    .iter()
                    .take(MAX_HISTORY_EVENTS)
                    .map(|e| e.to_history(tz))
                    .collect()
            },
            carrier_contact: self.carrier_contact(),
            detail: SummaryDetail::Full,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Legacy layout
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LegacyTrack {
    #[serde(default)]
    e: Option<i64>,
    #[serde(default)]
    w1: Option<u32>,
    #[serde(default)]
    z0: Option<LegacyEvent>,
    #[serde(default)]
    z1: Option<Vec<LegacyEvent>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LegacyEvent {
    #[serde(default)]
    a: Option<String>,
    #[serde(default)]
    c: Option<String>,
    #[serde(default)]
    z: Option<String>,
    #[serde(default)]
    s: Option<String>,
}

impl LegacyEvent {
    fn is_blank(&self) -> bool {
        [&self.a, &self.c, &self.z, &self.s]
            .iter()
            .all(|field| non_empty(field.as_deref()).is_none())
    }

    fn to_history(&self, tz: Tz) -> HistoryEntry {
        HistoryEntry {
            timestamp: non_empty(self.a.as_deref()).map(|ts| format_timestamp(ts, tz)),
            location: non_empty(self.c.as_deref()).map(str::to_string),
            description: non_empty(self.z.as_deref()).map(str::to_string),
        }
    }
}

impl LegacyTrack {
    fn events(&self) -> Vec<&LegacyEvent> {
        match self.z1.as_deref() {
            Some(list) if !list.is_empty() => list.iter().collect(),
            _ => self.z0.iter().filter(|e| !e.is_blank()).collect(),
        }
    }

    fn summarize(
        &self,
        tracking_number: &str,
        fallback_carrier: String,
        tz: Tz,
    ) -> TrackingSummary {
        let carrier = self
            .w1
            .and_then(CarrierHint::from_code)
            .map_or(fallback_carrier, |hint| hint.display_name().to_string());
        let events = self.events();

        let Some(latest) = events.first() else {
            return TrackingSummary::no_events(tracking_number, carrier);
        };

        let status = non_empty(latest.s.as_deref())
            .map(translate_status)
            .or_else(|| self.e.map(translate_legacy_status))
            .unwrap_or_else(|| UNKNOWN_STATUS.to_string());

        TrackingSummary {
            tracking_number: tracking_number.to_string(),
            carrier,
            status,
            location: non_empty(latest.c.as_deref())
                .unwrap_or(UNKNOWN_LOCATION)
                .to_string(),
            last_update: non_empty(latest.a.as_deref()).map(|ts| format_timestamp(ts, tz)),
            description: non_empty(latest.z.as_deref()).map(str::to_string),
            estimated_delivery: None,
            history: events
                .iter()
                .take(MAX_HISTORY_EVENTS)
                .map(|e| e.to_history(tz))
                .collect(),
            carrier_contact: None,
            detail: SummaryDetail::Full,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classification and entry point
// ─────────────────────────────────────────────────────────────────────────────

/// Structural classification of an accepted record.
#[derive(Debug, Clone)]
pub(crate) enum RawShape {
    ShapeA(LegacyTrack),
    ShapeB(ExtendedTrack),
    Unrecognized,
}

impl RawShape {
    /// Classifies by the presence of the defining section: `track_info` for the
    /// extended layout, `track` for the legacy one.
    ///
    /// # Errors
    ///
    /// Returns `NormalizeError` when the defining section exists but does not
    /// deserialize.
    pub(crate) fn classify(raw: &RawLookupResult) -> Result<Self, NormalizeError> {
        let value = raw.as_value();

        if let Some(info) = value.get("track_info").filter(|v| !v.is_null()) {
            let track = ExtendedTrack::deserialize(info).map_err(NormalizeError::Extended)?;
            return Ok(RawShape::ShapeB(track));
        }

        if let Some(track) = value.get("track").filter(|v| !v.is_null()) {
            let track = LegacyTrack::deserialize(track).map_err(NormalizeError::Legacy)?;
            return Ok(RawShape::ShapeA(track));
        }

        Ok(RawShape::Unrecognized)
    }
}

/// Display name for a provider carrier code.
#[must_use]
pub fn carrier_name_for_code(code: Option<u32>) -> String {
    match code {
        Some(code) => CarrierHint::from_code(code)
            .map_or_else(|| format!("Carrier #{code}"), |h| h.display_name().to_string()),
        None => UNKNOWN_CARRIER.to_string(),
    }
}

/// Produces the canonical summary for an accepted record. Never fails.
#[must_use]
pub fn normalize(tracking_number: &str, raw: &RawLookupResult, tz: Tz) -> TrackingSummary {
    let carrier = carrier_name_for_code(raw.carrier_code());

    match RawShape::classify(raw) {
        Ok(RawShape::ShapeB(track)) => {
            debug!(tracking_number, "Normalizing extended tracking record");
            track.summarize(tracking_number, carrier, tz)
        }
        Ok(RawShape::ShapeA(track)) => {
            debug!(tracking_number, "Normalizing legacy tracking record");
            track.summarize(tracking_number, carrier, tz)
        }
        Ok(RawShape::Unrecognized) => {
            warn!(tracking_number, "Accepted record has no known tracking section");
            TrackingSummary::unparsed(tracking_number, carrier)
        }
        Err(e) => {
            warn!(tracking_number, error = %e, "Failed to normalize tracking record");
            TrackingSummary::unparsed(tracking_number, carrier)
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
