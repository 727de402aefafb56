//! Resolving the run's target from a site name or literal coordinates.

use async_trait::async_trait;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc};
use tracing::{debug, warn};

use crate::{
    error::{InputError, truncate_body},
    http::{HttpClient, HttpRequest},
    model::{Coordinate, Site},
    provider::Number,
};

pub const DEFAULT_SITE_NAME: &str = "Custom Location";

/// Name-to-coordinate lookup service.
#[async_trait]
pub trait SiteLookup: Send + Sync + Debug {
    async fn find(&self, name: &str) -> Result<Site, InputError>;
}

/// `LAT,LON` in decimal degrees.
pub fn parse_coordinates(input: &str) -> Result<Coordinate, InputError> {
    let malformed = || InputError::MalformedCoordinates { input: input.to_string() };

    let (lat, lon) = input.split_once(',').ok_or_else(malformed)?;
    let latitude: f64 = lat.trim().parse().map_err(|_| malformed())?;
    let longitude: f64 = lon.trim().parse().map_err(|_| malformed())?;

    Coordinate::new(latitude, longitude)
}

/// Literal coordinates when `target` contains a comma, otherwise a lookup.
pub async fn resolve_target(
    target: &str,
    name: Option<&str>,
    lookup: &dyn SiteLookup,
) -> Result<Site, InputError> {
    if target.contains(',') {
        let coordinate = parse_coordinates(target)?;
        let name = name.unwrap_or(DEFAULT_SITE_NAME).to_string();
        debug!(%name, %coordinate, "using literal coordinates");
        return Ok(Site { name, coordinate });
    }

    lookup.find(target).await
}

/// Site search on ParaglidingEarth.com.
#[derive(Debug)]
pub struct ParaglidingEarthLookup {
    url: String,
    http: Arc<dyn HttpClient>,
}

impl ParaglidingEarthLookup {
    pub fn new(url: String, http: Arc<dyn HttpClient>) -> Self {
        Self { url, http }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<SearchFeature>,
}

#[derive(Debug, Deserialize)]
struct SearchFeature {
    name: Option<String>,
    lat: Option<Number>,
    lng: Option<Number>,
}

#[async_trait]
impl SiteLookup for ParaglidingEarthLookup {
    async fn find(&self, name: &str) -> Result<Site, InputError> {
        let failed = |message: String| InputError::LookupFailed { name: name.to_string(), message };

        let request = HttpRequest::get(&self.url).query("name", name);
        let response = self.http.get(&request).await.map_err(|e| failed(e.to_string()))?;

        if response.status == 403 {
            warn!(%name, "site search refused with 403");
            return Err(failed(
                "ParaglidingEarth returned 403 Forbidden (possible rate limiting), try again later"
                    .to_string(),
            ));
        }
        if !response.is_success() {
            return Err(failed(format!(
                "HTTP {}: {}",
                response.status,
                truncate_body(&response.body)
            )));
        }

        let parsed: SearchResponse = serde_json::from_str(&response.body)
            .map_err(|e| failed(format!("malformed response: {e}")))?;

        let not_found = || InputError::SiteNotFound { name: name.to_string() };
        let first = parsed.features.into_iter().next().ok_or_else(not_found)?;
        let latitude = first.lat.as_ref().and_then(Number::value).ok_or_else(not_found)?;
        let longitude = first.lng.as_ref().and_then(Number::value).ok_or_else(not_found)?;

        Ok(Site {
            name: first.name.unwrap_or_else(|| "Unknown".to_string()),
            coordinate: Coordinate::new(latitude, longitude)?,
        })
    }
}
