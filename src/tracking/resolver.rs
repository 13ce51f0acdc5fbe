//! Carrier resolution.
//!
//! A lookup first asks the provider to autodetect the carrier. When that yields
//! no accepted record the resolver walks a fixed list of carrier hints, one
//! attempt at a time, and stops at the first accepted record. Attempts never
//! run concurrently: "first" is defined by list order.

use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, info, warn};

use super::provider::{RawLookupResult, TrackingProvider};
use crate::core::config::AppConfig;
use crate::core::models::{CarrierHint, TrackingQuery};
use crate::errors::NotFound;

/// Wait policy between a `register` call and its paired query.
///
/// The provider needs time to start tracking a freshly registered number.
/// Each attempt waits `initial_delay` after registering, queries, and may
/// re-query up to `requery_attempts` times with delays doubling from
/// `2 * initial_delay`. The total wait of one attempt never exceeds `max_wait`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlePolicy {
    pub initial_delay: Duration,
    pub requery_attempts: usize,
    pub max_wait: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            requery_attempts: 0,
            max_wait: Duration::from_secs(10),
        }
    }
}

impl SettlePolicy {
    /// Wait before the first query of an attempt, clamped to `max_wait`.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.initial_delay.min(self.max_wait)
    }

    /// Delays before each re-query, dropping any that would overrun `max_wait`.
    #[must_use]
    pub fn requery_delays(&self) -> Vec<Duration> {
        let budget = self.max_wait.saturating_sub(self.settle_delay());
        let factor = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX);

        let mut spent = Duration::ZERO;
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_wait)
            .take(self.requery_attempts)
            .take_while(|delay| {
                spent += *delay;
                spent <= budget
            })
            .collect()
    }

    /// Upper bound on the time one attempt can spend waiting.
    #[must_use]
    pub fn worst_case_wait(&self) -> Duration {
        self.settle_delay() + self.requery_delays().iter().sum::<Duration>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Register the number (with the attempt's hint) before every query.
    pub register_before_query: bool,
    /// Hints tried in order after autodetection fails.
    pub fallback_carriers: Vec<CarrierHint>,
    pub settle: SettlePolicy,
}

impl ResolverConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            register_before_query: config.register_before_query,
            fallback_carriers: config.fallback_carriers.clone(),
            settle: SettlePolicy {
                initial_delay: config.register_settle_delay(),
                requery_attempts: config.register_requery_attempts,
                max_wait: config.register_max_wait(),
            },
        }
    }
}

pub struct CarrierResolver<P> {
    provider: P,
    config: ResolverConfig,
}

impl<P: TrackingProvider> CarrierResolver<P> {
    #[must_use]
    pub fn new(provider: P, config: ResolverConfig) -> Self {
        Self { provider, config }
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Carrier used by each attempt, in order. `None` is autodetection.
    ///
    /// A hint carried by the query goes first among the fallbacks and is not
    /// repeated.
    #[must_use]
    pub fn attempt_plan(&self, query: &TrackingQuery) -> Vec<Option<CarrierHint>> {
        let mut plan = vec![None];
        if let Some(hint) = query.carrier() {
            plan.push(Some(hint));
        }
        plan.extend(
            self.config
                .fallback_carriers
                .iter()
                .copied()
                .filter(|hint| Some(*hint) != query.carrier())
                .map(Some),
        );
        plan
    }

    /// Finds the first accepted record for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] once every attempt has come back without an
    /// accepted record. Transport failures of single attempts are not errors.
    #[tracing::instrument(level = "info", skip(self, query), fields(tracking_number = %query.number()))]
    pub async fn resolve(&self, query: &TrackingQuery) -> Result<RawLookupResult, NotFound> {
        let plan = self.attempt_plan(query);
        let attempts = plan.len();

        for (index, carrier) in plan.into_iter().enumerate() {
            if let Some(record) = self.attempt(query.number(), carrier).await {
                info!(
                    attempt = index + 1,
                    carrier = ?carrier,
                    "Tracking provider accepted query"
                );
                return Ok(record);
            }
            debug!(attempt = index + 1, carrier = ?carrier, "No accepted record, trying next");
        }

        info!(attempts, "No carrier produced tracking information");
        Err(NotFound)
    }

    async fn attempt(
        &self,
        number: &str,
        carrier: Option<CarrierHint>,
    ) -> Option<RawLookupResult> {
        if !self.config.register_before_query {
            return self.query_once(number, carrier).await;
        }

        if let Err(e) = self.provider.register(number, carrier).await {
            warn!(carrier = ?carrier, "Register call failed, querying anyway: {}", e);
        }

        tokio::time::sleep(self.config.settle.settle_delay()).await;

        let delays = self.config.settle.requery_delays();
        Retry::spawn(delays, move || async move {
            self.query_once(number, carrier).await.ok_or(())
        })
        .await
        .ok()
    }

    async fn query_once(
        &self,
        number: &str,
        carrier: Option<CarrierHint>,
    ) -> Option<RawLookupResult> {
        match self.provider.query(number, carrier).await {
            Ok(response) => {
                let code = response.code;
                let record = response.into_accepted();
                if record.is_none() {
                    debug!(carrier = ?carrier, code, "Provider returned no accepted record");
                }
                record
            }
            Err(e) => {
                warn!(carrier = ?carrier, "Tracking query failed: {}", e);
                None
            }
        }
    }
}
