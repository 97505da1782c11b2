use crate::infra::AppState;
use crate::reply::{render_reply, twiml, INVALID_ZIP_REPLY};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use burnban::resolution::{Inquiry, ZipCode};
use serde::Deserialize;
use serde_json::json;

pub(crate) const SMS_SOURCE: &str = "twilio_sms";
pub(crate) const API_SOURCE: &str = "http_api";

/// Twilio posts the message text as `Body` and the sender as `From`.
#[derive(Debug, Deserialize)]
pub(crate) struct SmsForm {
    #[serde(rename = "Body", default)]
    pub(crate) body: String,
    #[serde(rename = "From", default)]
    pub(crate) from: String,
}

pub(crate) fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/sms", post(sms_webhook))
        .route("/api/v1/burn-ban/:zip", get(burn_ban_endpoint))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn sms_webhook(
    State(state): State<AppState>,
    Form(form): Form<SmsForm>,
) -> Response {
    let message = match ZipCode::parse(form.body.trim()) {
        Some(zip) => {
            let inquiry = Inquiry::new(zip, form.from, SMS_SOURCE);
            let resolution = state.pipeline.resolve(&inquiry).await;
            render_reply(&resolution)
        }
        None => INVALID_ZIP_REPLY.to_string(),
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        twiml(&message),
    )
        .into_response()
}

pub(crate) async fn burn_ban_endpoint(
    State(state): State<AppState>,
    Path(raw_zip): Path<String>,
) -> Response {
    let Some(zip) = ZipCode::parse(&raw_zip) else {
        let payload = json!({ "error": INVALID_ZIP_REPLY });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    };

    let resolution = state
        .pipeline
        .resolve(&Inquiry::new(zip, "", API_SOURCE))
        .await;
    let message = render_reply(&resolution);

    (
        StatusCode::OK,
        Json(json!({
            "zip": resolution.zip,
            "county": resolution.county,
            "can_burn": resolution.outcome.can_burn(),
            "outcome": resolution.outcome,
            "message": message,
        })),
    )
        .into_response()
}
