//! HTTP surface: liveness endpoint and the WebSocket subscription endpoint

use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;
use worldscope_common::{HealthStatus, SERVICE_NAME};

use crate::broadcast::WsHub;

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<WsHub>,
    /// Cancelled on shutdown; every open socket is closed when it fires
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(hub: Arc<WsHub>, shutdown: CancellationToken) -> Self {
        Self { hub, shutdown }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(ws_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> impl IntoResponse {
    Json(HealthStatus::ok(SERVICE_NAME))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let id = Uuid::now_v7();
    // subscribe before anything else so no frame sent after the upgrade is missed
    let mut frames = state.hub.subscribe();
    let (mut sender, mut receiver) = socket.split();

    tracing::info!("[socket] connected: {}", id);

    let reason = loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = sender.send(Message::Close(None)).await;
                break "server shutdown";
            }
            frame = frames.recv() => match frame {
                Ok(text) => {
                    if sender.send(Message::Text(text.to_string().into())).await.is_err() {
                        break "send failed";
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[socket] {} lagging, skipped {} frames", id, skipped);
                }
                Err(RecvError::Closed) => break "hub closed",
            },
            inbound = receiver.next() => match inbound {
                None | Some(Ok(Message::Close(_))) => break "client closed",
                // viewers have nothing to say
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("[socket] {} transport error: {}", id, e);
                    break "transport error";
                }
            },
        }
    };

    tracing::info!("[socket] disconnected: {} ({})", id, reason);
}
