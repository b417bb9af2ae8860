use crate::api::AppState;
use crate::GIT_COMMIT_HASH;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::{atomic::Ordering, Arc};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub name: String,
    pub version: String,
    pub build: String,
    pub verified: u64,
    pub denied: u64,
}

// axum handler for health
pub async fn health<P>(State(state): State<Arc<AppState<P>>>) -> impl IntoResponse {
    let body = Json(Health {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: GIT_COMMIT_HASH.to_string(),
        verified: state.counters.verified.load(Ordering::Relaxed),
        denied: state.counters.denied.load(Ordering::Relaxed),
    });

    let short_hash = GIT_COMMIT_HASH.get(0..7).unwrap_or("");

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )) {
        headers.insert("X-App", value);
    }

    (headers, body)
}
