use crate::app::App;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Locally staged web build, relative to the executable directory.
pub const ROLLING_RELEASE_DIR: &str = "data/rolling-release";

/// Content type by extension only; the bytes are never inspected.
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html",
        Some("ico") => "image/x-icon",
        Some("png") => "image/png",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        _ => "application/octet-stream",
    }
}

/// Map a percent-encoded request path onto the rolling-release directory.
/// `None` for paths that would leave it or do not decode to UTF-8.
fn local_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let request_path = if decoded == "/" {
        "/index.html"
    } else {
        decoded.as_ref()
    };

    let mut file = root.to_path_buf();
    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => file.push(part),
            _ => return None,
        }
    }
    Some(file)
}

pub async fn serve_rolling_release(State(app): State<Arc<App>>, request: Request, next: Next) -> Response {
    if !app.config.rolling_release {
        return next.run(request).await;
    }

    let root = app.env.get_path(ROLLING_RELEASE_DIR);
    let Some(file) = local_path(&root, request.uri().path()) else {
        return next.run(request).await;
    };

    info!("[Rolling Release] {} {}", request.method(), file.display());

    match tokio::fs::read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type_for(&file))], bytes).into_response(),
        Err(_) => next.run(request).await,
    }
}
