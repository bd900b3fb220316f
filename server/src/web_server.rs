use std::any::Any;
use std::path::Path;

use axum::{
    Router,
    extract::{Request, State, WebSocketUpgrade},
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::sync::mpsc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    services::ServeDir,
};

use common::log;

use crate::broadcaster::ViewerBroadcaster;
use crate::games::snake::SessionCommand;
use crate::ws_handler::handle_websocket;

pub const NOT_FOUND_BODY: &str = "Page not found";
pub const INTERNAL_ERROR_BODY: &str = "Something broke!";

#[derive(Clone)]
pub struct WebServerState {
    pub viewers: ViewerBroadcaster,
    pub commands: mpsc::Sender<SessionCommand>,
}

pub async fn run_web_server(addr: &str, static_dir: &Path, state: WebServerState) -> std::io::Result<()> {
    let app = build_router(static_dir, state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log!("Web server listening on http://{}", listener.local_addr()?);
    log!("Serving static files from {}", static_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log!("Web server shut down gracefully");
    Ok(())
}

pub fn build_router(static_dir: &Path, state: WebServerState) -> Router {
    let static_files = ServeDir::new(static_dir).not_found_service(not_found.into_service());

    let router = Router::new()
        .route("/ws", get(ws_upgrade_handler))
        .fallback_service(static_files)
        .with_state(state);

    with_middleware(router)
}

/// Request logging, panic-to-500 and permissive CORS.
pub fn with_middleware(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    router
        .layer(middleware::from_fn(log_request))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

async fn log_request(request: Request, next: Next) -> Response {
    log!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    log!("Request handler panicked: {}", detail);
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use axum::body::{Body, to_bytes};
    use axum::http::Request as HttpRequest;
    use futures_util::{SinkExt, StreamExt};
    use rand::Rng;
    use tokio::time::timeout;
    use tokio_tungstenite::{connect_async, tungstenite::Message};
    use tower::ServiceExt;

    use common::games::SessionRng;
    use common::games::snake::{RunStatus, SnakeGame};
    use common::store::MemoryStore;
    use crate::decision_client::DecisionLink;
    use crate::games::snake::{GameSession, ViewEvent};
    use crate::server_config::ServerSettings;

    fn static_dir() -> PathBuf {
        let suffix: u64 = rand::rng().random();
        let dir = std::env::temp_dir().join(format!("snake_static_{}", suffix));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<canvas id=\"board\"></canvas>").unwrap();
        dir
    }

    fn idle_state() -> (WebServerState, mpsc::Receiver<SessionCommand>) {
        let (commands, commands_rx) = mpsc::channel(8);
        let state = WebServerState {
            viewers: ViewerBroadcaster::new(),
            commands,
        };
        (state, commands_rx)
    }

    async fn fetch(router: Router, uri: &str) -> (StatusCode, String) {
        let request = HttpRequest::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_serves_static_files() {
        let dir = static_dir();
        let (state, _commands) = idle_state();

        let (status, body) = fetch(build_router(&dir, state.clone()), "/index.html").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("board"));

        let (status, body) = fetch(build_router(&dir, state), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("board"));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let dir = static_dir();
        let (state, _commands) = idle_state();

        let (status, body) = fetch(build_router(&dir, state), "/missing.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, NOT_FOUND_BODY);

        std::fs::remove_dir_all(dir).unwrap();
    }

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let router = with_middleware(Router::new().route("/boom", get(explode)));
        let (status, body) = fetch(router, "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_viewer_plays_over_websocket() {
        let dir = static_dir();
        let viewers = ViewerBroadcaster::new();
        let (commands, commands_rx) = mpsc::channel(8);
        let session = GameSession::new(
            SnakeGame::new(SessionRng::new(5)),
            MemoryStore::new(),
            DecisionLink::offline(),
            viewers.clone(),
            ServerSettings::default(),
        );
        tokio::spawn(session.run(commands_rx));

        let app = build_router(&dir, WebServerState { viewers, commands });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let (mut socket, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();

        let next_state = |frame: Message| -> Option<RunStatus> {
            match serde_json::from_str::<ViewEvent>(frame.to_text().ok()?).ok()? {
                ViewEvent::State(view) => Some(view.status),
                _ => None,
            }
        };

        let first = timeout(Duration::from_secs(5), socket.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(next_state(first), Some(RunStatus::Idle));

        socket.send(Message::Text(r#"{"type":"play"}"#.into())).await.unwrap();
        let second = timeout(Duration::from_secs(5), socket.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(next_state(second), Some(RunStatus::Running));

        std::fs::remove_dir_all(dir).unwrap();
    }
}
