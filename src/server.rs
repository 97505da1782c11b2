use crate::cli::ServeArgs;
use crate::infra::{build_pipeline, AppState};
use crate::routes::app_router;
use axum_prometheus::PrometheusMetricLayer;
use burnban::config::AppConfig;
use burnban::error::AppError;
use burnban::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let pipeline = Arc::new(build_pipeline(&config)?);
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        pipeline,
    };

    let app = app_router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        ttl_seconds = config.dataset.ttl_seconds,
        cache_path = %config.dataset.cache_path.display(),
        forwarding = config.notify.sink_url.is_some(),
        "burn ban webhook ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
