//! Gzip transport compression.
//!
//! - Requests with `Content-Encoding: gzip` are inflated before any handler
//!   sees the body (bounded by `server.max_body_bytes`).
//! - Responses are deflated only when the client sent `Accept-Encoding: gzip`
//!   and the body is `application/json` or `text/html`. Plain-text answers
//!   pass through untouched.

use std::io::{Read, Write};

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use metrix_core::error::{MetrixError, Result};

use crate::api::ApiError;
use crate::app_state::AppState;

pub async fn gzip(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let accepts_gzip = header_has_token(req.headers(), header::ACCEPT_ENCODING, "gzip");

    let req = match inflate_request(req, app.max_body_bytes()).await {
        Ok(req) => req,
        Err(e) => return ApiError(e).into_response(),
    };

    let resp = next.run(req).await;
    if accepts_gzip && is_compressible(resp.headers()) {
        deflate_response(resp).await
    } else {
        resp
    }
}

fn header_has_token(headers: &HeaderMap, name: HeaderName, token: &str) -> bool {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|t| t.split(';').next().is_some_and(|t| t.trim().eq_ignore_ascii_case(token)))
}

fn is_compressible(headers: &HeaderMap) -> bool {
    if headers.contains_key(header::CONTENT_ENCODING) {
        return false;
    }
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json") || ct.starts_with("text/html"))
}

async fn inflate_request(req: Request, limit: usize) -> Result<Request> {
    if !header_has_token(req.headers(), header::CONTENT_ENCODING, "gzip") {
        return Ok(req);
    }

    let (mut parts, body) = req.into_parts();
    let compressed = to_bytes(body, limit)
        .await
        .map_err(|e| MetrixError::Encoding(format!("read gzip body failed: {e}")))?;
    let plain = gunzip(&compressed, limit)?;

    parts.headers.remove(header::CONTENT_ENCODING);
    parts.headers.remove(header::CONTENT_LENGTH);
    Ok(Request::from_parts(parts, Body::from(plain)))
}

fn gunzip(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(data)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| MetrixError::Encoding(format!("invalid gzip body: {e}")))?;
    if out.len() > limit {
        return Err(MetrixError::Encoding(format!(
            "decompressed body exceeds {limit} bytes"
        )));
    }
    Ok(out)
}

fn gzip_bytes(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data)?;
    enc.finish()
}

async fn deflate_response(resp: Response) -> Response {
    let (mut parts, body) = resp.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "buffering response for gzip failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match gzip_bytes(&bytes) {
        Ok(gz) => {
            parts
                .headers
                .insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
            parts.headers.remove(header::CONTENT_LENGTH);
            parts
                .headers
                .append(header::VARY, HeaderValue::from_static("accept-encoding"));
            Response::from_parts(parts, Body::from(gz))
        }
        Err(e) => {
            tracing::warn!(error = %e, "gzip response failed, sending identity");
            Response::from_parts(parts, Body::from(bytes))
        }
    }
}
