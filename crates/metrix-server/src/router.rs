//! Axum router wiring.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{api, app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::listing::index))
        .route("/update/", post(api::handlers::update))
        .route("/update/:kind/:name/:value", post(api::handlers::update_by_path))
        .route("/value/", post(api::handlers::value))
        .route("/value/:kind/:name", get(api::handlers::value_by_path))
        .layer(DefaultBodyLimit::max(state.max_body_bytes()))
        .layer(middleware::from_fn_with_state(state.clone(), transport::gzip::gzip))
        // outermost: sees the final status and the compressed size
        .layer(middleware::from_fn(transport::access_log::access_log))
        .with_state(state)
}
