use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Html,
    Json,
};
use tracing::{info, warn};
use utoipa::OpenApi;

use super::{
    dto::{decode_energy_usage, TotalEnergyUsageResponse, UsageReadingRequest},
    errors::ApiError,
};
use crate::{reading_store::ReadingStore, summary};

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Record one energy-usage reading for a device.
///
/// The body is decoded by hand rather than through the `Json` extractor so a
/// missing or non-JSON content type, or a malformed body, still gets the
/// plain-text `Invalid Request` response.
#[utoipa::path(
    post,
    path = "/api/{device_id}",
    params(
        ("device_id" = String, Path, description = "Device identifier"),
    ),
    request_body = UsageReadingRequest,
    responses(
        (status = 200, description = "Reading recorded"),
        (status = 400, description = "Missing or non-integer `energy-usage`", body = String, content_type = "text/plain"),
    ),
    tag = "readings"
)]
pub async fn post_reading(
    State(store): State<ReadingStore>,
    Path(device_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let value = match decode_energy_usage(content_type, &body) {
        Ok(value) => value,
        Err(e) => {
            warn!(device_id = %device_id, error = %e, "Rejected reading");
            return Err(e.into());
        }
    };

    if store.append(&device_id, value).await {
        let devices = store.len().await;
        info!(device_id = %device_id, devices, "New device registered");
    }
    info!(device_id = %device_id, value, "Reading recorded");

    Ok(StatusCode::OK)
}

/// Fetch every reading recorded for a device, in arrival order.
#[utoipa::path(
    get,
    path = "/api/{device_id}",
    params(
        ("device_id" = String, Path, description = "Device identifier"),
    ),
    responses(
        (status = 200, description = "Device readings", body = TotalEnergyUsageResponse),
        (status = 404, description = "Device Not Found", body = String, content_type = "text/plain"),
    ),
    tag = "readings"
)]
pub async fn get_readings(
    State(store): State<ReadingStore>,
    Path(device_id): Path<String>,
) -> Result<Json<TotalEnergyUsageResponse>, ApiError> {
    let readings = store.get(&device_id).await?;

    Ok(Json(TotalEnergyUsageResponse {
        total_energy_usage: readings,
    }))
}

/// HTML table of every device and its readings. Devices whose total usage
/// exceeds 1000 are highlighted in red.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Usage summary page", body = String, content_type = "text/html"),
    ),
    tag = "readings"
)]
pub async fn summary_page(State(store): State<ReadingStore>) -> Html<String> {
    let rows = store.summary().await;
    Html(summary::render_html(&rows))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(post_reading, get_readings, summary_page, health),
    components(schemas(UsageReadingRequest, TotalEnergyUsageResponse)),
    tags(
        (name = "readings", description = "Energy usage reading endpoints"),
        (name = "system",   description = "System endpoints"),
    ),
    info(
        title = "Energy Usage Service API",
        version = "0.1.0",
        description = "Collects integer energy-usage readings per device"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
