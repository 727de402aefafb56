use async_trait::async_trait;
use serde::Deserialize;
use std::{fmt, sync::Arc};
use tracing::debug;

use crate::{
    error::ProviderError,
    http::{HttpClient, HttpRequest},
    model::{Coordinate, ProviderResult},
};

use super::{
    Number, ProviderId, StationProvider, coordinate_from, expect_success, filter_within_radius,
    lenient_records, parse_json, settle,
};

/// Key value shipped in sample configs; treated as no key at all.
const PLACEHOLDER_KEY: &str = "your_ffvl_api_key_here";

/// FFVL beacon network (balisemeteo.com).
///
/// The API has no radius search, so every call downloads the full beacon
/// list and filters locally. This is the most expensive provider and the
/// first candidate for caching.
pub struct FfvlBeaconProvider {
    base_url: String,
    api_key: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl fmt::Debug for FfvlBeaconProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FfvlBeaconProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FfvlBeaconProvider {
    pub fn new(base_url: String, api_key: Option<String>, http: Arc<dyn HttpClient>) -> Self {
        let api_key = api_key.filter(|key| !key.is_empty() && key != PLACEHOLDER_KEY);
        Self { base_url, api_key, http }
    }

    async fn fetch(&self, target: Coordinate, radius_km: f64) -> Result<ProviderResult, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;

        let request = HttpRequest::get(&self.base_url)
            .query("base", "balises")
            .query("r", "list")
            .query("mode", "json")
            .query("key", api_key);

        let response = expect_success(&self.base_url, self.http.get(&request).await?)?;
        let values: Vec<serde_json::Value> = parse_json(&self.base_url, &response.body)?;
        let beacons: Vec<FfvlBeacon> = lenient_records(self.id(), values);
        debug!(total = beacons.len(), "FFVL beacon list downloaded");

        let candidates = beacons.into_iter().filter_map(|beacon| {
            let location = coordinate_from(
                beacon.latitude.as_ref().and_then(Number::value),
                beacon.longitude.as_ref().and_then(Number::value),
            )?;
            let name = beacon.nom.unwrap_or_else(|| "Unknown".to_string());
            Some((name, location))
        });

        Ok(ProviderResult::found(self.id(), filter_within_radius(target, radius_km, candidates)))
    }
}

#[derive(Debug, Deserialize)]
struct FfvlBeacon {
    nom: Option<String>,
    latitude: Option<Number>,
    longitude: Option<Number>,
}

#[async_trait]
impl StationProvider for FfvlBeaconProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Beacon
    }

    async fn query(&self, target: Coordinate, radius_km: f64) -> ProviderResult {
        settle(self.id(), self.fetch(target, radius_km).await)
    }
}
