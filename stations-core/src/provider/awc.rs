use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::ProviderError,
    geo::BoundingBox,
    http::{HttpClient, HttpRequest},
    model::{Coordinate, ProviderResult},
};

use super::{
    Number, ProviderId, StationProvider, coordinate_from, expect_success, filter_within_radius,
    lenient_records, parse_json, settle,
};

/// Aviation Weather Center METAR stations.
///
/// The API filters by bounding box server-side. The box over-selects at its
/// corners, so results still go through the exact distance filter.
#[derive(Debug)]
pub struct AwcMetarProvider {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl AwcMetarProvider {
    pub fn new(base_url: String, http: Arc<dyn HttpClient>) -> Self {
        Self { base_url, http }
    }

    async fn fetch(&self, target: Coordinate, radius_km: f64) -> Result<ProviderResult, ProviderError> {
        let bbox = BoundingBox::around(target, radius_km);
        debug!(bbox = %bbox.to_query(), "METAR bbox query");

        let request = HttpRequest::get(&self.base_url)
            .query("bbox", bbox.to_query())
            .query("format", "json")
            .header("Accept", "application/json");

        let response = expect_success(&self.base_url, self.http.get(&request).await?)?;
        // AWC answers 204 with an empty body when the box holds no stations.
        if response.body.trim().is_empty() {
            return Ok(ProviderResult::found(self.id(), Vec::new()));
        }

        let values: Vec<serde_json::Value> = parse_json(&self.base_url, &response.body)?;
        let reports: Vec<MetarReport> = lenient_records(self.id(), values);

        let candidates = reports.into_iter().filter_map(|report| {
            let location = coordinate_from(
                report.lat.as_ref().and_then(Number::value),
                report.lon.as_ref().and_then(Number::value),
            )?;
            let name = format!(
                "{} ({})",
                report.name.as_deref().unwrap_or("Unknown"),
                report.icao_id.as_deref().unwrap_or("N/A"),
            );
            Some((name, location))
        });

        Ok(ProviderResult::found(self.id(), filter_within_radius(target, radius_km, candidates)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetarReport {
    icao_id: Option<String>,
    name: Option<String>,
    lat: Option<Number>,
    lon: Option<Number>,
}

#[async_trait]
impl StationProvider for AwcMetarProvider {
    fn id(&self) -> ProviderId {
        ProviderId::AviationMetar
    }

    async fn query(&self, target: Coordinate, radius_km: f64) -> ProviderResult {
        settle(self.id(), self.fetch(target, radius_km).await)
    }
}
