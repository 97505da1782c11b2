use burnban::config::AppConfig;
use burnban::error::AppError;
use burnban::resolution::{
    ArcGisDatasetSource, DatasetCache, FccBoundaryLookup, GeoResolver, NominatimGeocoder,
    ResolutionPipeline, SnapshotStore, SystemClock, WebhookForwarder,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) pipeline: Arc<ResolutionPipeline>,
}

/// Wires the HTTP-backed collaborators described by `config` into a pipeline.
pub(crate) fn build_pipeline(config: &AppConfig) -> Result<ResolutionPipeline, AppError> {
    let clock = Arc::new(SystemClock);

    let source = ArcGisDatasetSource::new(&config.dataset.source_url, config.dataset.timeout)?;
    let dataset = DatasetCache::new(
        Arc::new(source),
        SnapshotStore::new(&config.dataset.cache_path),
        clock.clone(),
        config.dataset.ttl_seconds,
    );

    let geocoder = NominatimGeocoder::new(
        &config.geo.geocoder_url,
        &config.geo.user_agent,
        config.geo.timeout,
    )?;
    let boundaries = FccBoundaryLookup::new(
        &config.geo.boundary_url,
        &config.geo.user_agent,
        config.geo.timeout,
    )?;
    let forwarder = WebhookForwarder::new(config.notify.sink_url.clone(), config.notify.timeout)?;

    Ok(ResolutionPipeline::new(
        GeoResolver::new(Arc::new(geocoder), Arc::new(boundaries)),
        Arc::new(dataset),
        Arc::new(forwarder),
        clock,
    ))
}
