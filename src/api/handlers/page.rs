use crate::api::{shell, AppState};
use crate::gate::{self, HostHooks, MemoryStore, NavigationContext, PageLoad};
use crate::identity::IdentityProvider;
use axum::{
    extract::State,
    http::{
        header::{CACHE_CONTROL, REFERER, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode, Uri,
    },
    response::{Html, IntoResponse, Response},
};
use std::sync::{atomic::Ordering, Arc};
use tracing::{debug, instrument};

// axum handler for the gated college finder page
#[instrument(skip_all, fields(path = %uri.path()))]
pub async fn page<P: IdentityProvider>(
    State(state): State<Arc<AppState<P>>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let referrer = headers.get(REFERER).and_then(|value| value.to_str().ok());
    let context = NavigationContext::from_query(uri.query(), referrer);

    let hooks = HostHooks::new()
        .on_verified({
            let counters = state.counters.clone();
            move || {
                counters.verified.fetch_add(1, Ordering::Relaxed);
            }
        })
        .on_denied({
            let counters = state.counters.clone();
            move || {
                counters.denied.fetch_add(1, Ordering::Relaxed);
                debug!("page processes halted");
            }
        });

    let document = shell::college_finder(&state.gate.config().site_name);
    let mut load = PageLoad::new(document, MemoryStore::new(), hooks);

    let verified = gate::bootstrap(&state.gate, &context, &mut load).await;

    let (document, storage) = load.into_parts();

    let mut response_headers = HeaderMap::new();
    response_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    if !verified {
        return (
            StatusCode::FORBIDDEN,
            response_headers,
            Html(document.render()),
        )
            .into_response();
    }

    for (key, value) in storage.items() {
        if let Ok(cookie) = HeaderValue::from_str(&format!("{key}={value}; Path=/; SameSite=Lax")) {
            response_headers.append(SET_COOKIE, cookie);
        }
    }

    (StatusCode::OK, response_headers, Html(document.render())).into_response()
}
