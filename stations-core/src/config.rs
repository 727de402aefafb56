use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::provider::ProviderId;

/// Endpoint key for the paragliding-site lookup service.
pub const SITE_LOOKUP_ENDPOINT: &str = "pge";

const DEFAULT_ENDPOINTS: &[(&str, &str)] = &[
    ("ffvl", "https://data.ffvl.fr/api/"),
    ("pioupiou", "http://api.pioupiou.fr/v1"),
    ("metar", "https://aviationweather.gov/api/data/metar"),
    ("nws", "https://api.weather.gov"),
    ("bom", "http://reg.bom.gov.au/fwo"),
    (SITE_LOOKUP_ENDPOINT, "https://paraglidingearth.com/assets/ajax/searchSitesJSON.php"),
];

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// beacon_api_key = "..."
/// search_radius_km = 50.0
///
/// [endpoints]
/// nws = "https://api.weather.gov"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// FFVL beacon network key; the beacon provider is skipped without it.
    pub beacon_api_key: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_search_radius_km")]
    pub search_radius_km: f64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Base URLs keyed by provider name (`ffvl`, `nws`, ...) and `pge`.
    /// Keys left out fall back to the built-in endpoints.
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_search_radius_km() -> f64 {
    50.0
}

fn default_user_agent() -> String {
    format!("stations/{} WeatherStationComparison", env!("CARGO_PKG_VERSION"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            beacon_api_key: None,
            endpoints: HashMap::new(),
            request_timeout_secs: default_request_timeout_secs(),
            search_radius_km: default_search_radius_km(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        if cfg.search_radius_km.is_nan() || cfg.search_radius_km <= 0.0 {
            return Err(anyhow!("search_radius_km must be positive, got {}", cfg.search_radius_km));
        }
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "station-coverage", "stations")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Base URL for `name`, falling back to the built-in default.
    pub fn endpoint(&self, name: &str) -> &str {
        self.endpoints
            .get(name)
            .map(String::as_str)
            .or_else(|| DEFAULT_ENDPOINTS.iter().find(|(key, _)| *key == name).map(|(_, url)| *url))
            .unwrap_or_default()
    }

    pub fn provider_endpoint(&self, id: ProviderId) -> &str {
        self.endpoint(id.as_str())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Store the beacon key; blank input clears it.
    pub fn set_beacon_api_key(&mut self, api_key: String) {
        let trimmed = api_key.trim();
        self.beacon_api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn beacon_api_key(&self) -> Option<&str> {
        self.beacon_api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_fall_back_to_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.provider_endpoint(ProviderId::NationalWeatherService), "https://api.weather.gov");
        assert_eq!(cfg.endpoint(SITE_LOOKUP_ENDPOINT), DEFAULT_ENDPOINTS[5].1);
        assert_eq!(cfg.endpoint("unknown"), "");
    }

    #[test]
    fn every_provider_has_a_default_endpoint() {
        let cfg = Config::default();
        for id in ProviderId::all() {
            assert!(!cfg.provider_endpoint(*id).is_empty(), "{id} has no endpoint");
        }
    }

    #[test]
    fn overridden_endpoint_wins() {
        let cfg = Config::from_toml(
            r#"
            beacon_api_key = "KEY"

            [endpoints]
            nws = "http://localhost:8080"
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.provider_endpoint(ProviderId::NationalWeatherService), "http://localhost:8080");
        assert_eq!(cfg.provider_endpoint(ProviderId::CommunityWind), "http://api.pioupiou.fr/v1");
        assert_eq!(cfg.beacon_api_key(), Some("KEY"));
        assert_eq!(cfg.search_radius_km, 50.0);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let err = Config::from_toml("search_radius_km = 0.0").unwrap_err();
        assert!(err.to_string().contains("search_radius_km must be positive"));
    }

    #[test]
    fn blank_beacon_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_beacon_api_key("  ".into());
        assert_eq!(cfg.beacon_api_key, None);

        cfg.beacon_api_key = Some(String::new());
        assert_eq!(cfg.beacon_api_key(), None);

        cfg.set_beacon_api_key(" abc ".into());
        assert_eq!(cfg.beacon_api_key(), Some("abc"));
    }

    #[test]
    fn config_survives_toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_beacon_api_key("KEY".into());
        cfg.search_radius_km = 25.0;

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.beacon_api_key(), Some("KEY"));
        assert_eq!(back.search_radius_km, 25.0);
    }
}
