//! Per-request access log.

use std::time::Instant;

use axum::{
    body::HttpBody,
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};

pub async fn access_log(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let resp = next.run(req).await;

    let size = resp
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .or_else(|| resp.body().size_hint().exact())
        .unwrap_or(0);

    tracing::info!(
        %uri,
        %method,
        status = resp.status().as_u16(),
        duration_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
        response_size = size,
        "request processed"
    );
    resp
}
