use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    aggregate::{Aggregation, aggregate},
    model::Site,
    provider::StationProvider,
};

/// Everything one run produced. Rebuilt from scratch on every run.
#[derive(Debug, Clone, Serialize)]
pub struct Survey {
    pub site: Site,
    pub radius_km: f64,
    pub generated_at: DateTime<Utc>,
    pub aggregation: Aggregation,
}

/// Query every provider in order and merge their stations.
///
/// Providers run one after another; each one's failure stays local to its
/// own result.
pub async fn run(site: Site, radius_km: f64, providers: &[Box<dyn StationProvider>]) -> Survey {
    info!(site = %site.name, coordinate = %site.coordinate, radius_km, "surveying providers");

    let mut results = Vec::with_capacity(providers.len());
    for provider in providers {
        debug!(provider = %provider.id(), "querying");
        results.push(provider.query(site.coordinate, radius_km).await);
    }

    let aggregation = aggregate(&results);
    info!(unique = aggregation.unique_count(), "survey complete");

    Survey { site, radius_km, generated_at: Utc::now(), aggregation }
}
