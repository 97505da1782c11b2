use std::sync::Arc;

use tracing::{info, warn};

use super::clock::Clock;
use super::dataset::DatasetCache;
use super::domain::{DatasetSnapshot, Inquiry, Outcome, OutcomeEvent, Resolution};
use super::geo::GeoResolver;
use super::notify::NotificationForwarder;
use super::status::CountyStatusResolver;

pub const COUNTY_UNRESOLVED: &str = "Could not determine county";

/// ZIP → county → verdict. Every failure becomes an `Unknown` outcome.
pub struct ResolutionPipeline {
    geo: GeoResolver,
    dataset: Arc<DatasetCache>,
    forwarder: Arc<dyn NotificationForwarder>,
    clock: Arc<dyn Clock>,
}

impl ResolutionPipeline {
    pub fn new(
        geo: GeoResolver,
        dataset: Arc<DatasetCache>,
        forwarder: Arc<dyn NotificationForwarder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            geo,
            dataset,
            forwarder,
            clock,
        }
    }

    pub fn dataset(&self) -> &DatasetCache {
        &self.dataset
    }

    /// Resolves the inquiry and hands the result to the forwarder. Forwarding
    /// problems are logged and never change the returned resolution.
    pub async fn resolve(&self, inquiry: &Inquiry) -> Resolution {
        let resolution = self.resolve_zip(inquiry).await;

        info!(
            zip = %inquiry.zip,
            county = resolution.county.as_deref().unwrap_or(""),
            verdict = resolution.outcome.verdict.label(),
            error = resolution.outcome.error.as_deref().unwrap_or(""),
            "burn ban inquiry resolved"
        );

        let event = OutcomeEvent::from_resolution(inquiry, &resolution, self.clock.now());
        if let Err(err) = self.forwarder.forward(&event).await {
            warn!(error = %err, zip = %inquiry.zip, "failed to forward burn ban outcome");
        }

        resolution
    }

    async fn resolve_zip(&self, inquiry: &Inquiry) -> Resolution {
        let zip = inquiry.zip.clone();

        let county = match self.geo.resolve_county(&zip).await {
            Ok(county) => county,
            Err(err) => {
                warn!(error = %err, %zip, "ZIP to county lookup failed");
                return Resolution {
                    zip,
                    county: None,
                    outcome: Outcome::unknown(COUNTY_UNRESOLVED),
                };
            }
        };

        let outcome = match self.current_snapshot().await {
            Ok(snapshot) => CountyStatusResolver::lookup(&county, &snapshot),
            Err(message) => Outcome::unknown(message),
        };

        Resolution {
            zip,
            county: Some(county),
            outcome,
        }
    }

    /// Fresh snapshot when possible; the last persisted one when a refresh fails.
    async fn current_snapshot(&self) -> Result<DatasetSnapshot, String> {
        let refresh = self.dataset.ensure_fresh(false).await;

        match (refresh, self.dataset.read()) {
            (Ok(()), Ok(snapshot)) => Ok(snapshot),
            (Err(refresh_err), Ok(snapshot)) => {
                warn!(
                    error = %refresh_err,
                    fetched_at = %snapshot.fetched_at,
                    "refresh failed; serving stale burn ban table"
                );
                Ok(snapshot)
            }
            (Err(refresh_err), Err(_)) => Err(refresh_err.to_string()),
            (Ok(()), Err(read_err)) => Err(read_err.to_string()),
        }
    }
}
