use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::ProviderError,
    http::{HttpClient, HttpRequest},
    model::{Coordinate, Diagnostic, ProviderResult},
    regions::{self, NWS_ENVELOPES},
};

use super::{
    Number, ProviderId, StationProvider, coordinate_from, expect_success, filter_within_radius,
    lenient_records, parse_json, settle,
};

const GEOJSON: &str = "application/geo+json";

/// US National Weather Service (api.weather.gov).
///
/// Two steps: the target point resolves to grid metadata, which links to the
/// observation stations for that grid.
#[derive(Debug)]
pub struct NwsProvider {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl NwsProvider {
    pub fn new(base_url: String, http: Arc<dyn HttpClient>) -> Self {
        Self { base_url, http }
    }

    async fn fetch(&self, target: Coordinate, radius_km: f64) -> Result<ProviderResult, ProviderError> {
        let points_url = format!(
            "{}/points/{:.4},{:.4}",
            self.base_url.trim_end_matches('/'),
            target.latitude,
            target.longitude
        );
        let request = HttpRequest::get(&points_url).header("Accept", GEOJSON);

        let response = self.http.get(&request).await?;
        if response.status == 404 {
            return Ok(ProviderResult::empty(
                self.id(),
                Diagnostic::OutOfCoverage("point is not on an NWS forecast grid".to_string()),
            ));
        }
        let response = expect_success(&points_url, response)?;
        let point: PointResponse = parse_json(&points_url, &response.body)?;

        let Some(stations_url) = point.properties.and_then(|p| p.observation_stations) else {
            debug!(url = %points_url, "grid point has no observation station link");
            return Ok(ProviderResult::found(self.id(), Vec::new()));
        };

        let request = HttpRequest::get(&stations_url).header("Accept", GEOJSON);
        let response = expect_success(&stations_url, self.http.get(&request).await?)?;
        let collection: StationCollection = parse_json(&stations_url, &response.body)?;
        let features: Vec<StationFeature> = lenient_records(self.id(), collection.features);

        let candidates = features.into_iter().filter_map(|feature| {
            // GeoJSON order is [lon, lat].
            let coords = feature.geometry?.coordinates;
            let [lon, lat, ..] = coords.as_slice() else {
                return None;
            };
            let location = coordinate_from(lat.value(), lon.value())?;
            let name = feature
                .properties
                .and_then(|p| p.name)
                .unwrap_or_else(|| "Unknown".to_string());
            Some((name, location))
        });

        Ok(ProviderResult::found(self.id(), filter_within_radius(target, radius_km, candidates)))
    }
}

#[derive(Debug, Deserialize)]
struct PointResponse {
    properties: Option<PointProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    observation_stations: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StationCollection {
    #[serde(default)]
    features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StationFeature {
    properties: Option<StationProperties>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct StationProperties {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<Number>,
}

#[async_trait]
impl StationProvider for NwsProvider {
    fn id(&self) -> ProviderId {
        ProviderId::NationalWeatherService
    }

    async fn query(&self, target: Coordinate, radius_km: f64) -> ProviderResult {
        if !regions::covers(NWS_ENVELOPES, target) {
            return settle(
                self.id(),
                Ok(ProviderResult::empty(
                    self.id(),
                    Diagnostic::OutOfCoverage("outside US coverage".to_string()),
                )),
            );
        }
        settle(self.id(), self.fetch(target, radius_km).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeHttp;

    const BASE: &str = "https://nws.test";
    const DENVER: Coordinate = Coordinate { latitude: 39.7392, longitude: -104.9903 };
    const POINTS_URL: &str = "https://nws.test/points/39.7392,-104.9903";
    const STATIONS_URL: &str = "https://nws.test/gridpoints/BOU/62,60/stations";

    fn provider(http: &Arc<FakeHttp>) -> NwsProvider {
        NwsProvider::new(BASE.to_string(), Arc::clone(http) as Arc<dyn HttpClient>)
    }

    #[tokio::test]
    async fn paris_is_rejected_without_a_request() {
        let http = Arc::new(FakeHttp::new());
        let paris = Coordinate { latitude: 48.0, longitude: 2.0 };
        let result = provider(&http).query(paris, 50.0).await;

        assert!(result.stations.is_empty());
        assert!(matches!(result.diagnostic, Some(Diagnostic::OutOfCoverage(_))));
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn follows_grid_metadata_to_station_list() {
        let points = format!(r#"{{"properties": {{"gridId": "BOU", "observationStations": "{STATIONS_URL}"}}}}"#);
        let stations = r#"{"type": "FeatureCollection", "features": [
            {"geometry": {"type": "Point", "coordinates": [-104.8493, 39.5706]}, "properties": {"stationIdentifier": "KAPA", "name": "Denver, Centennial Airport"}},
            {"geometry": {"type": "Point", "coordinates": [-104.6563, 39.8466]}, "properties": {"stationIdentifier": "KDEN", "name": "Denver International Airport"}},
            {"geometry": {"type": "Point", "coordinates": [-106.8175, 39.2232]}, "properties": {"name": "Aspen-Pitkin County Airport"}},
            {"geometry": {"type": "Point", "coordinates": [-104.9]}, "properties": {"name": "Truncated"}},
            {"geometry": null, "properties": {"name": "No geometry"}},
            {"geometry": {"type": "Point", "coordinates": [-105.0, 39.75]}}
        ]}"#;
        let http = Arc::new(
            FakeHttp::new().respond(POINTS_URL, 200, &points).respond(STATIONS_URL, 200, stations),
        );

        let result = provider(&http).query(DENVER, 50.0).await;

        let names: Vec<&str> = result.stations.iter().map(|s| s.display_name.as_str()).collect();
        assert_eq!(names, vec!["Denver, Centennial Airport", "Denver International Airport", "Unknown"]);
        assert_eq!(result.stations[0].location, Coordinate { latitude: 39.5706, longitude: -104.8493 });

        let urls: Vec<String> = http.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec![POINTS_URL.to_string(), STATIONS_URL.to_string()]);
    }

    #[tokio::test]
    async fn not_found_point_is_a_coverage_gap() {
        let http = Arc::new(FakeHttp::new().respond(POINTS_URL, 404, r#"{"title": "Data Unavailable"}"#));
        let result = provider(&http).query(DENVER, 50.0).await;

        assert!(result.stations.is_empty());
        assert!(matches!(result.diagnostic, Some(Diagnostic::OutOfCoverage(_))));
        assert_eq!(http.requests().len(), 1);
    }

    #[tokio::test]
    async fn missing_station_link_is_empty_without_second_request() {
        let http = Arc::new(FakeHttp::new().respond(POINTS_URL, 200, r#"{"properties": {}}"#));
        let result = provider(&http).query(DENVER, 50.0).await;

        assert_eq!(result, ProviderResult::found(ProviderId::NationalWeatherService, Vec::new()));
        assert_eq!(http.requests().len(), 1);
    }

    #[tokio::test]
    async fn failing_station_list_is_unavailable() {
        let points = format!(r#"{{"properties": {{"observationStations": "{STATIONS_URL}"}}}}"#);
        let http = Arc::new(
            FakeHttp::new().respond(POINTS_URL, 200, &points).respond(STATIONS_URL, 502, "bad gateway"),
        );
        let result = provider(&http).query(DENVER, 50.0).await;

        assert!(result.stations.is_empty());
        assert!(matches!(result.diagnostic, Some(Diagnostic::Unavailable(ref m)) if m.contains("502")));
    }
}
