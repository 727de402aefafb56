//! Core library for the `stations` CLI.
//!
//! This crate defines:
//! - Great-circle math and coarse regional envelopes
//! - Adapters that normalize each weather-station provider into a common record
//! - Cross-provider deduplication and the coverage report
//! - Configuration & site lookup
//!
//! It is used by `stations-cli`, but the `Survey` it produces is plain
//! serializable data for any other consumer.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod geo;
pub mod http;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod regions;
pub mod report;
pub mod survey;

pub use aggregate::{AggregatedStation, Aggregation, StationKey, aggregate};
pub use config::Config;
pub use error::{InputError, ProviderError};
pub use http::{HttpClient, ReqwestHttpClient};
pub use lookup::{ParaglidingEarthLookup, SiteLookup, resolve_target};
pub use model::{Coordinate, Diagnostic, ProviderResult, Site, StationRecord};
pub use provider::{ProviderId, StationProvider, providers_from_config};
pub use report::CoverageReport;
pub use survey::Survey;
