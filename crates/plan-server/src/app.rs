//! Router construction.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::live_reload;
use crate::middleware::headers;
use crate::state::AppState;

/// Create the preview router: `/events` for live reload, everything else
/// served from the build output directory.
pub(crate) fn create_router(state: Arc<AppState>, output_dir: &Path) -> Router {
    Router::new()
        .route("/events", get(live_reload::events))
        .fallback_service(ServeDir::new(output_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(headers::no_cache_layer())
                .layer(headers::content_type_options_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
    use axum::http::{Method, Request, StatusCode};
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::live_reload::{BrokerHandle, RELOAD_EVENT, spawn_broker};

    fn setup() -> (tempfile::TempDir, BrokerHandle, Router) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("2024/01/05")).unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Now</h1>").unwrap();
        std::fs::write(dir.path().join("2024/01/05/index.html"), "<h1>Then</h1>").unwrap();
        std::fs::write(dir.path().join("feed.xml"), "<rss/>").unwrap();

        let broker = spawn_broker();
        let state = Arc::new(AppState {
            broker: broker.clone(),
            heartbeat: Duration::from_secs(60),
        });
        let router = create_router(state, dir.path());
        (dir, broker, router)
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_root_index() {
        let (_dir, _broker, router) = setup();

        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "no-cache");
        assert_eq!(response.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(body_text(response).await, "<h1>Now</h1>");
    }

    #[tokio::test]
    async fn test_serves_day_page() {
        let (_dir, _broker, router) = setup();

        let response = router
            .oneshot(Request::get("/2024/01/05/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<h1>Then</h1>");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (_dir, _broker, router) = setup();

        let response = router
            .oneshot(Request::get("/1999/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_is_not_allowed() {
        let (_dir, _broker, router) = setup();

        for uri in ["/", "/events"] {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method(Method::POST)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_events_stream_reload() {
        let (_dir, broker, router) = setup();

        let response = router
            .oneshot(Request::get("/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");

        // The subscription is registered before the response is returned.
        broker.broadcast();

        let mut body = response.into_body().into_data_stream();
        let chunk = tokio::time::timeout(Duration::from_secs(1), body.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(
            String::from_utf8(chunk.to_vec()).unwrap(),
            format!("data: {RELOAD_EVENT}\n\n")
        );
    }
}
