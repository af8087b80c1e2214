//! Static assets for the browser client
//!
//! Embedded from `public/` at build time; anything not embedded is looked up
//! in the configured public directory on disk.

use super::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "public"]
struct Assets;

/// Serve embedded static files, with filesystem fallback
pub async fn serve_static(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let Some(path) = asset_path(uri.path()) else {
        return not_found();
    };

    if let Some(content) = Assets::get(&path) {
        return asset_response(&path, content.data.into_owned());
    }

    match tokio::fs::read(state.public_dir.join(&path)).await {
        Ok(content) => asset_response(&path, content),
        Err(_) => not_found(),
    }
}

/// Map a request path to a relative asset path; `None` for traversal attempts
fn asset_path(uri_path: &str) -> Option<String> {
    let trimmed = uri_path.trim_start_matches('/');
    let path = if trimmed.is_empty() || trimmed.ends_with('/') {
        format!("{trimmed}index.html")
    } else {
        trimmed.to_string()
    };

    if path
        .split('/')
        .any(|segment| segment == ".." || segment.contains('\\'))
    {
        return None;
    }
    Some(path)
}

fn asset_response(path: &str, content: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.as_ref().to_string())],
        Body::from(content),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_router;
    use crate::dispatch::Dispatcher;
    use crate::gateway::ModelGateway;
    use crate::testing::MockLlmService;
    use crate::tools::ToolRegistry;
    use axum::http::Request;
    use reqwest::Client;
    use std::path::Path;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(public_dir: &Path) -> axum::Router {
        let tools = Arc::new(ToolRegistry::new(None, Client::new()));
        let gateway = Arc::new(ModelGateway::new(
            Arc::new(MockLlmService::new("mock")),
            tools.definitions(),
        ));
        let dispatcher = Arc::new(Dispatcher::new(gateway, tools));
        create_router(AppState::new(dispatcher, public_dir.to_path_buf()))
    }

    async fn get(app: axum::Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn content_type(response: &Response) -> String {
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_asset_path() {
        assert_eq!(asset_path("/").as_deref(), Some("index.html"));
        assert_eq!(asset_path("/script.js").as_deref(), Some("script.js"));
        assert_eq!(asset_path("/img/").as_deref(), Some("img/index.html"));
        assert_eq!(asset_path("/../secret"), None);
        assert_eq!(asset_path("/a/../../b"), None);
    }

    #[tokio::test]
    async fn test_root_serves_embedded_index() {
        let dir = tempfile::tempdir().unwrap();
        let response = get(app(dir.path()), "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(content_type(&response).starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_embedded_script() {
        let dir = tempfile::tempdir().unwrap();
        let response = get(app(dir.path()), "/script.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(content_type(&response).contains("javascript"));
    }

    #[tokio::test]
    async fn test_filesystem_fallback_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "plain contents").unwrap();

        let response = get(app(dir.path()), "/notes.txt").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(content_type(&response).starts_with("text/plain"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"plain contents");
    }

    #[tokio::test]
    async fn test_missing_asset_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = get(app(dir.path()), "/nope.css").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_to_asset_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
