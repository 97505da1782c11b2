#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use burnban::resolution::{
    BoundaryLookup, Coordinates, DatasetCache, DatasetSource, Feature, FetchError, GeoError,
    Geocoder, GeoResolver, ManualClock, NotificationForwarder, NotifyError, OutcomeEvent,
    ResolutionPipeline, SnapshotStore, ZipCode,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

pub fn start_of_test() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, 2, 9, 0, 0).unwrap()
}

pub fn millis_for(year: i32, month: u32, day: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .unwrap()
        .timestamp_millis()
}

pub fn feature(county: &str, status: &str, start_date: Option<i64>) -> Feature {
    serde_json::from_value(json!({
        "attributes": {
            "County": county,
            "BurnBan": status,
            "StartDate": start_date,
            "CountyID": 1,
        }
    }))
    .expect("feature json")
}

/// Geocoder backed by a ZIP -> county table. Unknown ZIPs resolve to nothing.
#[derive(Default)]
pub struct DirectoryGeo {
    counties: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl DirectoryGeo {
    pub fn new(entries: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            counties: entries
                .iter()
                .map(|(zip, county)| (zip.to_string(), county.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    fn index_of(&self, zip: &str) -> Option<f64> {
        zip.parse::<f64>()
            .ok()
            .filter(|_| self.counties.contains_key(zip))
    }
}

#[async_trait]
impl Geocoder for DirectoryGeo {
    async fn locate(&self, zip: &ZipCode) -> Result<Option<Coordinates>, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.index_of(zip.as_str()).map(|latitude| Coordinates {
            latitude,
            longitude: 0.0,
        }))
    }
}

#[async_trait]
impl BoundaryLookup for DirectoryGeo {
    async fn county_at(&self, point: Coordinates) -> Result<Option<String>, GeoError> {
        let zip = format!("{:05}", point.latitude as u32);
        Ok(self
            .counties
            .get(&zip)
            .map(|county| format!("{county} County")))
    }
}

/// Dataset source replaying a queue of responses; the last one repeats.
pub struct QueuedSource {
    responses: Mutex<Vec<Result<Vec<Feature>, FetchError>>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl QueuedSource {
    pub fn new(responses: Vec<Result<Vec<Feature>, FetchError>>) -> Arc<Self> {
        Self::with_delay(responses, Duration::ZERO)
    }

    pub fn with_delay(
        responses: Vec<Result<Vec<Feature>, FetchError>>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetSource for QueuedSource {
    async fn fetch(&self) -> Result<Vec<Feature>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut responses = self.responses.lock().expect("responses poisoned");
        if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses.first().cloned().unwrap_or(Err(FetchError::NoData))
        }
    }
}

#[derive(Default)]
pub struct RecordingForwarder {
    pub events: Mutex<Vec<OutcomeEvent>>,
    pub fail: bool,
}

impl RecordingForwarder {
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn events(&self) -> Vec<OutcomeEvent> {
        self.events.lock().expect("events poisoned").clone()
    }
}

#[async_trait]
impl NotificationForwarder for RecordingForwarder {
    async fn forward(&self, event: &OutcomeEvent) -> Result<(), NotifyError> {
        self.events.lock().expect("events poisoned").push(event.clone());
        if self.fail {
            return Err(NotifyError::Transport("flow endpoint returned 502".to_string()));
        }
        Ok(())
    }
}

pub struct Harness {
    pub pipeline: ResolutionPipeline,
    pub geo: Arc<DirectoryGeo>,
    pub source: Arc<QueuedSource>,
    pub forwarder: Arc<RecordingForwarder>,
    pub clock: Arc<ManualClock>,
    pub dataset: Arc<DatasetCache>,
    pub dir: tempfile::TempDir,
}

pub fn harness(
    geo: Arc<DirectoryGeo>,
    source: Arc<QueuedSource>,
    forwarder: Arc<RecordingForwarder>,
) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = Arc::new(ManualClock::new(start_of_test()));
    let dataset = Arc::new(DatasetCache::new(
        source.clone(),
        SnapshotStore::new(dir.path().join("burn_ban_data.csv")),
        clock.clone(),
        3600,
    ));
    let pipeline = ResolutionPipeline::new(
        GeoResolver::new(geo.clone(), geo.clone()),
        dataset.clone(),
        forwarder.clone(),
        clock.clone(),
    );

    Harness {
        pipeline,
        geo,
        source,
        forwarder,
        clock,
        dataset,
        dir,
    }
}
