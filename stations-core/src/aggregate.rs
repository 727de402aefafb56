//! Cross-provider station deduplication.
//!
//! Providers share no station identifier, so two records are the same
//! physical station when their coordinates agree to four decimal places
//! (about 11 m).

use serde::{Serialize, Serializer};
use std::{
    collections::{BTreeMap, BTreeSet, btree_map::Entry},
    fmt,
};

use crate::{
    model::{Coordinate, Diagnostic, ProviderResult, StationRecord},
    provider::ProviderId,
};

const KEY_SCALE: f64 = 10_000.0;

/// A coordinate rounded to four decimals, held in ten-thousandths of a degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationKey {
    lat_e4: i64,
    lon_e4: i64,
}

impl StationKey {
    pub fn from_coordinate(coordinate: Coordinate) -> Self {
        Self {
            lat_e4: (coordinate.latitude * KEY_SCALE).round() as i64,
            lon_e4: (coordinate.longitude * KEY_SCALE).round() as i64,
        }
    }
}

impl fmt::Display for StationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat_e4 as f64 / KEY_SCALE, self.lon_e4 as f64 / KEY_SCALE)
    }
}

impl Serialize for StationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One physical station and every provider that reported it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedStation {
    pub key: StationKey,
    /// First record seen for this key. Which provider supplies it depends on
    /// processing order; it is not a canonical choice.
    pub representative: StationRecord,
    pub observed_by: BTreeSet<ProviderId>,
}

/// Per-provider numbers before deduplication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderTally {
    pub provider: ProviderId,
    pub raw_count: usize,
    pub diagnostic: Option<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    /// Providers in the order they were supplied.
    pub providers: Vec<ProviderTally>,
    pub stations: BTreeMap<StationKey, AggregatedStation>,
}

impl Aggregation {
    pub fn unique_count(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn provider_ids(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.providers.iter().map(|tally| tally.provider)
    }
}

/// Merge provider results, in the given order, into one deduplicated set.
pub fn aggregate(results: &[ProviderResult]) -> Aggregation {
    let mut stations: BTreeMap<StationKey, AggregatedStation> = BTreeMap::new();
    let mut providers = Vec::with_capacity(results.len());

    for result in results {
        providers.push(ProviderTally {
            provider: result.provider,
            raw_count: result.stations.len(),
            diagnostic: result.diagnostic.clone(),
        });

        for record in &result.stations {
            let key = StationKey::from_coordinate(record.location);
            match stations.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(AggregatedStation {
                        key,
                        representative: record.clone(),
                        observed_by: BTreeSet::from([result.provider]),
                    });
                }
                Entry::Occupied(mut slot) => {
                    slot.get_mut().observed_by.insert(result.provider);
                }
            }
        }
    }

    Aggregation { providers, stations }
}
