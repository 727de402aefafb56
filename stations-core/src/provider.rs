use crate::{
    Config,
    error::{ProviderError, truncate_body},
    geo,
    http::{HttpClient, HttpResponse},
    model::{Coordinate, Diagnostic, ProviderResult, StationRecord},
    provider::{
        awc::AwcMetarProvider, bom::BomProvider, ffvl::FfvlBeaconProvider, nws::NwsProvider,
        pioupiou::PioupiouProvider,
    },
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{convert::TryFrom, fmt::Debug, sync::Arc};
use tracing::{debug, info, warn};

pub mod awc;
pub mod bom;
pub mod ffvl;
pub mod nws;
pub mod pioupiou;

/// The providers under comparison, in report column order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ProviderId {
    /// FFVL beacon network.
    #[serde(rename = "ffvl")]
    Beacon,
    /// Pioupiou / OpenWindMap community wind stations.
    #[serde(rename = "pioupiou")]
    CommunityWind,
    /// Aviation Weather Center METAR stations.
    #[serde(rename = "metar")]
    AviationMetar,
    /// US National Weather Service observation stations.
    #[serde(rename = "nws")]
    NationalWeatherService,
    /// Australian Bureau of Meteorology.
    #[serde(rename = "bom")]
    BureauOfMeteorology,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Beacon => "ffvl",
            ProviderId::CommunityWind => "pioupiou",
            ProviderId::AviationMetar => "metar",
            ProviderId::NationalWeatherService => "nws",
            ProviderId::BureauOfMeteorology => "bom",
        }
    }

    /// Column header in the coverage table.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderId::Beacon => "FFVL Beacons",
            ProviderId::CommunityWind => "Pioupiou",
            ProviderId::AviationMetar => "AWC METAR",
            ProviderId::NationalWeatherService => "NWS",
            ProviderId::BureauOfMeteorology => "BOM",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[
            ProviderId::Beacon,
            ProviderId::CommunityWind,
            ProviderId::AviationMetar,
            ProviderId::NationalWeatherService,
            ProviderId::BureauOfMeteorology,
        ]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        ProviderId::all().iter().copied().find(|id| id.as_str() == lower).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: ffvl, pioupiou, metar, nws, bom."
            )
        })
    }
}

/// One station source. `query` never fails: transport and parse problems
/// come back as an empty result with a diagnostic.
#[async_trait]
pub trait StationProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn query(&self, target: Coordinate, radius_km: f64) -> ProviderResult;
}

/// Construct a single provider from config.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
    http: Arc<dyn HttpClient>,
) -> Box<dyn StationProvider> {
    let base_url = config.provider_endpoint(id).to_owned();
    match id {
        ProviderId::Beacon => Box::new(FfvlBeaconProvider::new(
            base_url,
            config.beacon_api_key().map(str::to_owned),
            http,
        )),
        ProviderId::CommunityWind => Box::new(PioupiouProvider::new(base_url, http)),
        ProviderId::AviationMetar => Box::new(AwcMetarProvider::new(base_url, http)),
        ProviderId::NationalWeatherService => Box::new(NwsProvider::new(base_url, http)),
        ProviderId::BureauOfMeteorology => Box::new(BomProvider::new()),
    }
}

/// Every provider, in declared order.
pub fn providers_from_config(
    config: &Config,
    http: Arc<dyn HttpClient>,
) -> Vec<Box<dyn StationProvider>> {
    ProviderId::all().iter().map(|id| provider_from_config(*id, config, Arc::clone(&http))).collect()
}

/// Turn an adapter's fallible fetch into the never-failing result.
pub(crate) fn settle(
    id: ProviderId,
    outcome: Result<ProviderResult, ProviderError>,
) -> ProviderResult {
    match outcome {
        Ok(result) => {
            match &result.diagnostic {
                Some(diagnostic) => info!(provider = %id, %diagnostic, "no stations"),
                None => info!(provider = %id, count = result.stations.len(), "stations in radius"),
            }
            result
        }
        Err(err) => {
            warn!(provider = %id, error = %err, "provider query failed");
            ProviderResult::empty(id, Diagnostic::Unavailable(err.to_string()))
        }
    }
}

/// Keep candidates within `radius_km` of `target`, in input order.
pub(crate) fn filter_within_radius(
    target: Coordinate,
    radius_km: f64,
    candidates: impl IntoIterator<Item = (String, Coordinate)>,
) -> Vec<StationRecord> {
    candidates
        .into_iter()
        .filter_map(|(display_name, location)| {
            let distance = geo::distance_km(target, location);
            (distance <= radius_km).then_some(StationRecord {
                display_name,
                location,
                distance_from_target_km: distance,
            })
        })
        .collect()
}

pub(crate) fn expect_success(url: &str, response: HttpResponse) -> Result<HttpResponse, ProviderError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ProviderError::Status {
            url: url.to_string(),
            status: response.status,
            body: truncate_body(&response.body),
        })
    }
}

pub(crate) fn parse_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|source| ProviderError::Json { url: url.to_string(), source })
}

/// Decode each element on its own, dropping the ones that don't fit `T`.
pub(crate) fn lenient_records<T: DeserializeOwned>(
    id: ProviderId,
    values: Vec<serde_json::Value>,
) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                debug!(provider = %id, error = %err, "skipping malformed record");
                None
            }
        })
        .collect()
}

/// Providers disagree on whether coordinates are JSON numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Number {
    Float(f64),
    Text(String),
}

impl Number {
    pub(crate) fn value(&self) -> Option<f64> {
        let v = match self {
            Number::Float(v) => *v,
            Number::Text(s) => s.trim().parse().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

/// A valid coordinate from optional parts, or `None` to skip the record.
pub(crate) fn coordinate_from(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coordinate> {
    Coordinate::new(latitude?, longitude?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeHttp;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_parse_ignores_case() {
        assert_eq!(ProviderId::try_from("NWS").unwrap(), ProviderId::NationalWeatherService);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn provider_ids_sort_in_column_order() {
        let mut ids = vec![ProviderId::BureauOfMeteorology, ProviderId::Beacon, ProviderId::AviationMetar];
        ids.sort();
        assert_eq!(ids, vec![ProviderId::Beacon, ProviderId::AviationMetar, ProviderId::BureauOfMeteorology]);
    }

    #[test]
    fn provider_id_serializes_as_machine_name() {
        let json = serde_json::to_string(&ProviderId::CommunityWind).unwrap();
        assert_eq!(json, "\"pioupiou\"");
    }

    #[test]
    fn providers_from_config_builds_all_in_order() {
        let http: Arc<dyn HttpClient> = Arc::new(FakeHttp::new());
        let providers = providers_from_config(&Config::default(), http);
        let ids: Vec<ProviderId> = providers.iter().map(|p| p.id()).collect();
        assert_eq!(ids, ProviderId::all());
    }

    #[test]
    fn filter_keeps_boundary_and_drops_outside() {
        let target = Coordinate { latitude: 0.0, longitude: 0.0 };
        let near = Coordinate { latitude: 0.1, longitude: 0.0 };
        let far = Coordinate { latitude: 1.0, longitude: 0.0 };
        let radius = geo::distance_km(target, near);

        let kept = filter_within_radius(
            target,
            radius,
            vec![("near".to_string(), near), ("far".to_string(), far), ("here".to_string(), target)],
        );

        let names: Vec<&str> = kept.iter().map(|s| s.display_name.as_str()).collect();
        assert_eq!(names, vec!["near", "here"]);
        assert_eq!(kept[1].distance_from_target_km, 0.0);
    }

    #[test]
    fn numbers_accept_strings_and_reject_garbage() {
        let parsed: Vec<Number> = serde_json::from_str(r#"[45.5, "6.25", " 7 ", "n/a", "NaN"]"#).unwrap();
        let values: Vec<Option<f64>> = parsed.iter().map(Number::value).collect();
        assert_eq!(values, vec![Some(45.5), Some(6.25), Some(7.0), None, None]);
    }

    #[test]
    fn coordinate_from_skips_missing_or_invalid() {
        assert!(coordinate_from(Some(45.0), Some(6.0)).is_some());
        assert!(coordinate_from(None, Some(6.0)).is_none());
        assert!(coordinate_from(Some(95.0), Some(6.0)).is_none());
    }

    #[test]
    fn settle_downgrades_errors_to_empty_results() {
        let result = settle(ProviderId::AviationMetar, Err(ProviderError::MissingApiKey));
        assert!(result.stations.is_empty());
        assert_eq!(result.diagnostic, Some(Diagnostic::Unavailable("API key not configured".into())));
    }

    #[test]
    fn non_success_status_becomes_status_error() {
        let response = HttpResponse { status: 503, body: "busy".into() };
        let err = expect_success("http://x", response).unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 503, .. }));
    }
}
