use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::ProviderError,
    http::{HttpClient, HttpRequest},
    model::{Coordinate, ProviderResult},
};

use super::{
    Number, ProviderId, StationProvider, coordinate_from, expect_success, filter_within_radius,
    lenient_records, parse_json, settle,
};

/// Pioupiou / OpenWindMap community wind stations. Full list, filtered locally.
#[derive(Debug)]
pub struct PioupiouProvider {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl PioupiouProvider {
    pub fn new(base_url: String, http: Arc<dyn HttpClient>) -> Self {
        Self { base_url, http }
    }

    async fn fetch(&self, target: Coordinate, radius_km: f64) -> Result<ProviderResult, ProviderError> {
        let url = format!("{}/live-with-meta/all", self.base_url.trim_end_matches('/'));
        let request = HttpRequest::get(&url);

        let response = expect_success(&url, self.http.get(&request).await?)?;
        let parsed: PioupiouResponse = parse_json(&url, &response.body)?;
        let stations: Vec<PioupiouStation> = lenient_records(self.id(), parsed.data);

        let candidates = stations.into_iter().filter_map(|station| {
            let meta = station.meta?;
            let location = coordinate_from(
                meta.latitude.as_ref().and_then(Number::value),
                meta.longitude.as_ref().and_then(Number::value),
            )?;
            let name = meta.name.unwrap_or_else(|| {
                let id = match station.id {
                    Some(serde_json::Value::String(id)) => id,
                    Some(id) => id.to_string(),
                    None => "Unknown".to_string(),
                };
                format!("Pioupiou {id}")
            });
            Some((name, location))
        });

        Ok(ProviderResult::found(self.id(), filter_within_radius(target, radius_km, candidates)))
    }
}

#[derive(Debug, Deserialize)]
struct PioupiouResponse {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PioupiouStation {
    id: Option<serde_json::Value>,
    meta: Option<PioupiouMeta>,
}

#[derive(Debug, Deserialize)]
struct PioupiouMeta {
    name: Option<String>,
    latitude: Option<Number>,
    longitude: Option<Number>,
}

#[async_trait]
impl StationProvider for PioupiouProvider {
    fn id(&self) -> ProviderId {
        ProviderId::CommunityWind
    }

    async fn query(&self, target: Coordinate, radius_km: f64) -> ProviderResult {
        settle(self.id(), self.fetch(target, radius_km).await)
    }
}
