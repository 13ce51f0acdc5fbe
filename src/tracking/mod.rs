//! Tracking lookup: provider client, carrier resolution and normalization

pub mod normalizer;
pub mod provider;
pub mod resolver;
pub mod status;

pub use normalizer::normalize;
pub use provider::{QueryResponse, RawLookupResult, TrackingApiClient, TrackingProvider};
pub use resolver::{CarrierResolver, ResolverConfig, SettlePolicy};
