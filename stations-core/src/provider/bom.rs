use async_trait::async_trait;

use crate::{
    model::{Coordinate, Diagnostic, ProviderResult},
    regions::{self, BOM_ENVELOPES},
};

use super::{ProviderId, StationProvider, settle};

/// Australian Bureau of Meteorology.
///
/// Station lists are only published per state, and those sub-queries are not
/// implemented. The provider still takes part in every comparison so the
/// report shows it explicitly as not implemented rather than omitting it.
#[derive(Debug, Default)]
pub struct BomProvider;

impl BomProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StationProvider for BomProvider {
    fn id(&self) -> ProviderId {
        ProviderId::BureauOfMeteorology
    }

    async fn query(&self, target: Coordinate, _radius_km: f64) -> ProviderResult {
        let diagnostic = if regions::covers(BOM_ENVELOPES, target) {
            Diagnostic::NotImplemented("BOM requires state-specific queries".to_string())
        } else {
            Diagnostic::OutOfCoverage("outside Australia".to_string())
        };
        settle(self.id(), Ok(ProviderResult::empty(self.id(), diagnostic)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inside_australia_is_not_implemented() {
        let sydney = Coordinate { latitude: -33.87, longitude: 151.21 };
        let result = BomProvider::new().query(sydney, 50.0).await;

        assert!(result.stations.is_empty());
        assert!(matches!(result.diagnostic, Some(Diagnostic::NotImplemented(_))));
    }

    #[tokio::test]
    async fn elsewhere_is_out_of_coverage() {
        let annecy = Coordinate { latitude: 45.9, longitude: 6.9 };
        let result = BomProvider::new().query(annecy, 50.0).await;

        assert_eq!(
            result.diagnostic,
            Some(Diagnostic::OutOfCoverage("outside Australia".to_string()))
        );
    }
}
