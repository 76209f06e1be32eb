//! Ingestion and query handlers.
//!
//! Encoding is picked per request from `Content-Type`: `application/json`
//! selects the envelope body, anything else the path segments. Both funnel
//! into the same core validation, so the two encodings agree.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;

use metrix_core::metric::parse_update;
use metrix_core::{MetricEnvelope, MetricKind, MetricValue, MetrixError};

use super::error::ApiError;
use crate::app_state::AppState;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

type ApiResult = Result<Response, ApiError>;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

/// `POST /update/{type}/{name}/{value}`
pub async fn update_by_path(
    State(app): State<AppState>,
    Path((kind, name, raw)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    if is_json(&headers) {
        return update_json(&app, &body).await;
    }

    let value = parse_update(&kind, &name, &raw)?;
    app.repo().update(&name, value).await?;
    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], "").into_response())
}

/// `POST /update/`
///
/// Without a JSON body there are no path segments to read, so the name is missing.
pub async fn update(State(app): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult {
    if !is_json(&headers) {
        return Err(MetrixError::MissingName.into());
    }
    update_json(&app, &body).await
}

/// Apply an envelope and answer with the stored value read back after the
/// write (the accumulated total for counters, not the delta sent).
async fn update_json(app: &AppState, body: &[u8]) -> ApiResult {
    let (name, value) = MetricEnvelope::from_slice(body)?.into_update()?;
    let repo = app.repo();
    repo.update(&name, value).await?;

    let stored = repo
        .get(value.kind(), &name)
        .await
        .ok_or_else(|| MetrixError::Storage(format!("{name} missing after update")))?;
    Ok(Json(MetricEnvelope::from_value(name, stored)).into_response())
}

/// `GET /value/{type}/{name}`
pub async fn value_by_path(
    State(app): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
) -> ApiResult {
    let kind: MetricKind = kind.parse()?;
    let value = lookup(&app, kind, &name).await?;
    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], value.to_string()).into_response())
}

/// `POST /value/`
pub async fn value(State(app): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult {
    if !is_json(&headers) {
        return Err(MetrixError::UnsupportedMediaType.into());
    }

    let env = MetricEnvelope::from_slice(&body)?;
    let (kind, name) = env.query()?;
    let value = lookup(&app, kind, name).await?;
    Ok(Json(MetricEnvelope::from_value(name, value)).into_response())
}

async fn lookup(app: &AppState, kind: MetricKind, name: &str) -> Result<MetricValue, ApiError> {
    app.repo()
        .get(kind, name)
        .await
        .ok_or_else(|| MetrixError::NotFound(format!("{kind} {name}")).into())
}
