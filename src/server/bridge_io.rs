//! `POST /bridge/fs/write` and `POST /bridge/fs/read`.
//!
//! Both routes always answer 200 with a JSON envelope; failures are
//! reported through `success: false`, never through the HTTP status.

use crate::app::App;
use crate::errors::{BridgeError, BridgeResult};
use crate::models::{BridgeResponse, IoRequest};
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::debug;

pub const FS_WRITE_PATH: &str = "/bridge/fs/write";
pub const FS_READ_PATH: &str = "/bridge/fs/read";

#[derive(Debug, Clone, Copy)]
enum IoRoute {
    Write,
    Read,
}

fn route_for(request: &Request) -> Option<IoRoute> {
    if request.method() != Method::POST {
        return None;
    }
    match request.uri().path() {
        FS_WRITE_PATH => Some(IoRoute::Write),
        FS_READ_PATH => Some(IoRoute::Read),
        _ => None,
    }
}

pub async fn handle_bridge_io(State(app): State<Arc<App>>, request: Request, next: Next) -> Response {
    let Some(route) = route_for(&request) else {
        return next.run(request).await;
    };
    debug!("Bridge {:?} {}", route, request.uri().path());

    let envelope = match read_params(request.into_body()).await {
        Ok(params) => run_io(app, route, params).await,
        Err(e) => BridgeResponse::error(e.to_string()),
    };
    json_envelope(&envelope)
}

async fn read_params(body: Body) -> BridgeResult<IoRequest> {
    let bytes: Bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| BridgeError::InvalidInput(format!("Cannot read request body: {}", e)))?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn run_io(app: Arc<App>, route: IoRoute, params: IoRequest) -> BridgeResponse {
    let result = tokio::task::spawn_blocking(move || match route {
        IoRoute::Write => app.write_file(&params.path, &params.content, &params.options),
        IoRoute::Read => app.read_file(&params.path, &params.options),
    })
    .await;

    result.unwrap_or_else(|e| BridgeResponse::error(format!("File operation aborted: {}", e)))
}

fn json_envelope(envelope: &BridgeResponse) -> Response {
    let body = serde_json::to_vec(envelope)
        .unwrap_or_else(|e| format!(r#"{{"success":false,"error":"{}"}}"#, e).into_bytes());
    (
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::app_in;
    use crate::config::ProfileDocument;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn router(dir: &TempDir) -> Router {
        let app = app_in(dir.path(), ProfileDocument::default());
        crate::server::with_bridge(Router::new().fallback(|| async { "downstream" }), app)
    }

    async fn post(router: Router, path: &str, body: impl Into<Body>) -> (StatusCode, String, Value) {
        let response = router
            .oneshot(
                Request::post(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, content_type, value)
    }

    #[tokio::test]
    async fn write_then_read_through_http() {
        let dir = tempfile::tempdir().unwrap();

        let (status, content_type, body) = post(
            router(&dir),
            FS_WRITE_PATH,
            json!({"path": "data/profile.txt", "content": "hello", "options": {}}).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json; charset=utf-8");
        assert_eq!(body, json!({"success": true, "data": "Success"}));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("data/profile.txt")).unwrap(),
            "hello"
        );

        let (_, _, body) = post(
            router(&dir),
            FS_READ_PATH,
            json!({"path": "data/profile.txt", "options": {"mode": "Text"}}).to_string(),
        )
        .await;
        assert_eq!(body, json!({"success": true, "data": "hello"}));
    }

    #[tokio::test]
    async fn unparsable_write_body_is_a_200_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let (status, content_type, body) = post(router(&dir), FS_WRITE_PATH, "{not json").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json; charset=utf-8");
        assert_eq!(body["success"], json!(false));
        assert!(!body["error"].as_str().unwrap().is_empty());
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn body_missing_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _, body) = post(router(&dir), FS_READ_PATH, r#"{"options":{}}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("path"));
    }

    #[tokio::test]
    async fn failed_read_is_reported_with_200() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _, body) = post(
            router(&dir),
            FS_READ_PATH,
            json!({"path": "missing.txt"}).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn other_methods_and_paths_are_forwarded() {
        let dir = tempfile::tempdir().unwrap();

        let response = router(&dir)
            .oneshot(Request::get(FS_WRITE_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"downstream");

        let response = router(&dir)
            .oneshot(Request::post("/bridge/fs/WRITE").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"downstream");
    }
}
