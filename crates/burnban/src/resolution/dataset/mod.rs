//! Local copy of the official county burn ban table.
//!
//! [`DatasetCache`] decides when the upstream table must be downloaded again,
//! persists every successful download to a `;`-delimited file and serves reads
//! from that file. Refreshes are serialized through a mutex held from the
//! freshness check until the new file is in place: callers that queue behind an
//! in-flight refresh re-check freshness once they get the lock and reuse the
//! file it produced instead of fetching again.

mod source;
mod store;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::clock::Clock;
use super::domain::{CountyRecord, DatasetSnapshot};

pub use source::{ArcGisDatasetSource, DatasetSource, Feature, FeatureAttributes, FeatureCollection};
pub use store::{SnapshotStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("burn ban dataset request failed: {0}")]
    Network(String),
    #[error("burn ban dataset returned no data")]
    NoData,
    #[error("burn ban dataset has not been downloaded yet")]
    NotInitialized,
    #[error("burn ban dataset could not be stored or loaded: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<StoreError> for FetchError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

// Largest TTL chrono can represent as a whole number of seconds.
const MAX_TTL_SECONDS: u64 = (i64::MAX / 1_000) as u64;

/// Freshness bookkeeping. `last_refresh` only moves after a snapshot is persisted.
#[derive(Debug, Clone, Default)]
pub struct CacheState {
    pub last_refresh: Option<DateTime<Utc>>,
}

pub struct DatasetCache {
    source: Arc<dyn DatasetSource>,
    store: SnapshotStore,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl DatasetCache {
    pub fn new(
        source: Arc<dyn DatasetSource>,
        store: SnapshotStore,
        clock: Arc<dyn Clock>,
        ttl_seconds: u64,
    ) -> Self {
        let ttl = Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64);
        Self {
            source,
            store,
            clock,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.last_refresh
    }

    /// Downloads the table unless a persisted copy is younger than the TTL.
    /// `force` always downloads.
    pub async fn ensure_fresh(&self, force: bool) -> Result<(), FetchError> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        if !force {
            if state.last_refresh.is_none() {
                // Survive restarts: the file's mtime is the fetch time on this cache's clock.
                state.last_refresh = self.store.persisted_at();
            }

            if let Some(last) = state.last_refresh {
                if last > now {
                    warn!(%last, %now, "burn ban table is dated in the future; treating as stale");
                } else if self.store.persisted_at().is_some() && now - last < self.ttl {
                    debug!(%last, "using cached burn ban table");
                    return Ok(());
                }
            }
        }

        info!(force, "downloading official burn ban table");
        let features = self.source.fetch().await?;
        if features.is_empty() {
            return Err(FetchError::NoData);
        }

        let records: Vec<CountyRecord> = features.iter().map(CountyRecord::from).collect();
        let snapshot = DatasetSnapshot::new(records, now);
        self.store.save(&snapshot)?;

        state.last_refresh = Some(now);
        info!(
            counties = snapshot.len(),
            path = %self.store.path().display(),
            "burn ban table saved"
        );
        Ok(())
    }

    /// Last persisted snapshot, read back from disk.
    pub fn read(&self) -> Result<DatasetSnapshot, FetchError> {
        self.store.load()?.ok_or(FetchError::NotInitialized)
    }
}
