mod bridge_io;
mod rolling_release;

pub use bridge_io::{FS_READ_PATH, FS_WRITE_PATH};
pub use rolling_release::{content_type_for, ROLLING_RELEASE_DIR};

use crate::app::App;
use crate::errors::BridgeResult;
use crate::shell::Shutdown;
use axum::{middleware, Router};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Frontend build served when a request is not intercepted.
pub const FRONTEND_DIST: &str = "frontend/dist";

/// How long in-flight requests may keep the server alive after quit.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Wrap `router` so bridge routes and rolling-release files are answered
/// locally. Everything else reaches `router` unchanged.
pub fn with_bridge(router: Router, app: Arc<App>) -> Router {
    router
        .layer(middleware::from_fn_with_state(
            Arc::clone(&app),
            rolling_release::serve_rolling_release,
        ))
        .layer(middleware::from_fn_with_state(app, bridge_io::handle_bridge_io))
}

/// Serve the frontend build behind the bridge until quit is requested.
pub async fn start_server(app: Arc<App>, shutdown: Arc<Shutdown>) -> BridgeResult<()> {
    let assets = ServeDir::new(app.env.get_path(FRONTEND_DIST));
    let router = with_bridge(Router::new().fallback_service(assets), Arc::clone(&app))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", app.config.server_host, app.config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Bridge listening on {}", listener.local_addr()?);

    serve_until_quit(listener, router, shutdown, SHUTDOWN_GRACE).await
}

/// Serve `router` until quit is requested, then let open requests finish
/// for at most `grace` before returning.
async fn serve_until_quit(
    listener: TcpListener,
    router: Router,
    shutdown: Arc<Shutdown>,
    grace: Duration,
) -> BridgeResult<()> {
    let server = {
        let shutdown = Arc::clone(&shutdown);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .into_future()
    };

    tokio::select! {
        result = server => result?,
        _ = async {
            shutdown.wait().await;
            tokio::time::sleep(grace).await;
        } => warn!("Requests still open {:?} after quit, stopping anyway", grace),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::app_in;
    use crate::config::ProfileDocument;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn unmatched_requests_reach_the_frontend_build() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(FRONTEND_DIST)).unwrap();
        std::fs::write(dir.path().join(FRONTEND_DIST).join("app.js"), "console.log(1)").unwrap();
        let app = app_in(dir.path(), ProfileDocument::default());

        let router = with_bridge(
            Router::new().fallback_service(ServeDir::new(app.env.get_path(FRONTEND_DIST))),
            app,
        );
        let response = router
            .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"console.log(1)");
    }

    #[tokio::test]
    async fn server_stops_when_quit_is_requested() {
        use crate::shell::AppControl;

        let dir = tempfile::tempdir().unwrap();
        let app = app_in(
            dir.path(),
            ProfileDocument {
                server_port: Some(0),
                ..Default::default()
            },
        );
        let shutdown = Arc::new(Shutdown::new());
        let server = tokio::spawn(start_server(app, Arc::clone(&shutdown)));

        shutdown.quit();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn stalled_request_does_not_hold_the_server_after_quit() {
        use crate::shell::AppControl;
        use tokio::io::AsyncWriteExt;

        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path(), ProfileDocument::default());
        let router = with_bridge(Router::new(), app);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Shutdown::new());
        let server = tokio::spawn(serve_until_quit(
            listener,
            router,
            Arc::clone(&shutdown),
            Duration::from_millis(200),
        ));

        // Promise 100 body bytes, send 8 and keep the connection open.
        let mut client = tokio::net::TcpStream::connect(addr).await.unwrap();
        client
            .write_all(
                format!(
                    "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{{\"path\":",
                    FS_WRITE_PATH, addr
                )
                .as_bytes(),
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        shutdown.quit();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server kept running after quit")
            .unwrap()
            .unwrap();
        drop(client);
    }
}
