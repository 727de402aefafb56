use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{error::InputError, provider::ProviderId};

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the WGS84 ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InputError> {
        let in_range = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        if !in_range {
            return Err(InputError::OutOfRange { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// The resolved target of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub coordinate: Coordinate,
}

/// One station as reported by one provider, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub display_name: String,
    pub location: Coordinate,
    pub distance_from_target_km: f64,
}

/// Why a provider contributed no stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "note", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Target lies outside the provider's geographic coverage.
    OutOfCoverage(String),
    /// Provider is deliberately not queried.
    NotImplemented(String),
    /// Transport, status, parse or credential failure.
    Unavailable(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::OutOfCoverage(note) => write!(f, "out of coverage: {note}"),
            Diagnostic::NotImplemented(note) => write!(f, "not implemented: {note}"),
            Diagnostic::Unavailable(note) => write!(f, "unavailable: {note}"),
        }
    }
}

/// Stations from a single provider query. Empty is a normal outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: ProviderId,
    pub stations: Vec<StationRecord>,
    pub diagnostic: Option<Diagnostic>,
}

impl ProviderResult {
    pub fn found(provider: ProviderId, stations: Vec<StationRecord>) -> Self {
        Self { provider, stations, diagnostic: None }
    }

    pub fn empty(provider: ProviderId, diagnostic: Diagnostic) -> Self {
        Self { provider, stations: Vec::new(), diagnostic: Some(diagnostic) }
    }
}
