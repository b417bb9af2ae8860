//! HTTP host for the gated college finder.
//!
//! `GET /` runs the access gate against the request (query string and `Referer`)
//! and serves either the search shell or the access-denied page. `GET /health`
//! reports build metadata and gate decision counters.

use crate::gate::AccessGate;
use crate::identity::IdentityProvider;
use anyhow::Result;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
    Router,
};
use std::sync::{atomic::AtomicU64, Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;

pub mod handlers;
pub mod shell;

/// Decision counters, advanced by the host hooks of each page load.
#[derive(Debug, Default)]
pub struct GateCounters {
    pub verified: AtomicU64,
    pub denied: AtomicU64,
}

pub struct AppState<P> {
    pub gate: AccessGate<P>,
    pub counters: Arc<GateCounters>,
}

impl<P> AppState<P> {
    #[must_use]
    pub fn new(gate: AccessGate<P>) -> Self {
        Self {
            gate,
            counters: Arc::new(GateCounters::default()),
        }
    }
}

/// Build the router with request ids and tracing applied.
pub fn router<P>(state: Arc<AppState<P>>) -> Router
where
    P: IdentityProvider + 'static,
{
    Router::new()
        .route("/", get(handlers::page::<P>))
        .route("/health", get(handlers::health::<P>))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        )
        .with_state(state)
}

/// Serve the gated host.
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn new<P>(port: u16, state: Arc<AppState<P>>) -> Result<()>
where
    P: IdentityProvider + 'static,
{
    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, router(state).into_make_service()).await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateConfig;
    use crate::identity::{Identity, ProviderError};
    use axum::http::{header, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct Accepting;

    impl IdentityProvider for Accepting {
        async fn exchange(&self, _token: &str) -> Result<Identity, ProviderError> {
            Ok(Identity::new("uid-1", Some("x@y.com".to_string())))
        }
    }

    fn state() -> Arc<AppState<Accepting>> {
        Arc::new(AppState::new(AccessGate::new(
            GateConfig::default(),
            Accepting,
        )))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .map(http_body_util::Collected::to_bytes)
            .unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn trusted_referrer_gets_the_shell() {
        let state = state();
        let response = router(state.clone())
            .oneshot(
                Request::builder()
                    .uri("/?token=abc123")
                    .header(header::REFERER, "https://nextstep-nexn.onrender.com/search")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::SET_COOKIE)
                .and_then(|v| v.to_str().ok()),
            Some("authVerified=true; Path=/; SameSite=Lax")
        );
        assert!(response.headers().contains_key("x-request-id"));

        let body = body_string(response).await;
        assert!(body.contains("Find Colleges"));
        assert!(!body.contains("Access Denied"));
        assert_eq!(
            state.counters.verified.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn untrusted_request_is_denied() {
        let state = state();
        let response = router(state.clone())
            .oneshot(
                Request::builder()
                    .uri("/?token=abc123&source=elsewhere")
                    .header(header::REFERER, "https://evil.example/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let body = body_string(response).await;
        assert!(body.contains("Access Denied"));
        assert!(body.contains("Invalid referrer or source"));
        assert!(body.contains("href=\"https://nextstep-nexn.onrender.com/\""));
        assert!(!body.contains("Find Colleges"));
        assert_eq!(
            state.counters.denied.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn health_reports_counters() {
        let state = state();
        let app = router(state);

        let denied = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-App"));

        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(body["denied"], 1);
        assert_eq!(body["verified"], 0);
    }
}
