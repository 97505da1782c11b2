//! Burn ban resolution for a U.S. ZIP code.
//!
//! [`ResolutionPipeline`] geocodes the ZIP to a county, makes sure the cached
//! county status table is fresh, and maps the county's row to a
//! [`BurnVerdict`]. Each outcome is also handed to a [`NotificationForwarder`].

pub mod clock;
pub mod dataset;
pub mod domain;
pub mod geo;
mod normalizer;
pub mod notify;
pub mod pipeline;
pub mod status;
#[cfg(test)]
mod test_http;
pub mod zip;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dataset::{
    ArcGisDatasetSource, CacheState, DatasetCache, DatasetSource, Feature, FetchError,
    SnapshotStore,
};
pub use domain::{
    BurnVerdict, CountyRecord, DatasetSnapshot, Inquiry, Outcome, OutcomeEvent, Resolution,
};
pub use geo::{
    BoundaryLookup, Coordinates, FccBoundaryLookup, GeoError, GeoResolver, Geocoder,
    NominatimGeocoder,
};
pub use notify::{NotificationForwarder, NotifyError, WebhookForwarder};
pub use pipeline::{ResolutionPipeline, COUNTY_UNRESOLVED};
pub use status::{CountyStatusResolver, LookupError};
pub use zip::ZipCode;
