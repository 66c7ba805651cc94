//! WebSocket server implementation.
//!
//! Accepts connections at `/ws`. Every connection must authenticate first
//! (`{"type":"authenticate","token":...}`); on an invalid or missing token
//! the server sends an error frame and closes. Authenticated clients
//! subscribe to loans and receive progress / guarantor-action events from
//! the [`RealtimeHub`].

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vouch_types::Timestamp;

use crate::hub::RealtimeHub;
use crate::messages::{ClientMessage, ServerMessage};

/// The WebSocket server: a port plus the shared hub instance.
///
/// The hub is an explicit instance handed in by the caller, bound on boot
/// and shut down with the server, never ambient global state.
pub struct WebSocketServer {
    pub port: u16,
    pub hub: Arc<RealtimeHub>,
}

impl WebSocketServer {
    pub fn new(port: u16, hub: Arc<RealtimeHub>) -> Self {
        Self { port, hub }
    }

    /// Listen for connections until `shutdown` resolves, then close the
    /// hub (dropping every subscriber queue) and return.
    pub async fn run(
        &self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let app = router(self.hub.clone());
        let addr = format!("0.0.0.0:{}", self.port);
        info!("WebSocket server listening on {addr}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        self.hub.shutdown();
        info!("WebSocket server stopped");
        Ok(())
    }
}

/// Build the `/ws` router around a hub instance.
pub fn router(hub: Arc<RealtimeHub>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/ws/stats", get(stats_handler))
        .with_state(hub)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(hub): State<Arc<RealtimeHub>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn stats_handler(State(hub): State<Arc<RealtimeHub>>) -> impl IntoResponse {
    let stats = hub.stats();
    Json(serde_json::json!({
        "connections": stats.connections,
        "subscriptions": stats.subscriptions,
        "loans": stats.loans,
    }))
}

/// Handle one connection.
///
/// Flow:
/// 1. Split the socket; spawn a writer task draining a per-connection
///    queue so a slow client never blocks hub fan-out.
/// 2. Require an `authenticate` frame before anything else.
/// 3. Accept `subscribe_loan` frames, registering with the hub.
/// 4. On disconnect, unsubscribe from every loan.
async fn handle_socket(socket: WebSocket, hub: Arc<RealtimeHub>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    debug!("new WebSocket client connected");

    // Authentication gate: the first frame decides whether the connection
    // lives. An error frame is pushed before close so the client learns why.
    let identity = match ws_receiver.next().await {
        Some(Ok(Message::Text(text))) => match parse_client_message(&text) {
            Ok(ClientMessage::Authenticate { token }) => {
                match hub.authenticate(&token, Timestamp::now()) {
                    Ok(identity) => identity,
                    Err(e) => {
                        warn!(error = %e, "client failed authentication");
                        let _ = tx.send(
                            ServerMessage::Error {
                                message: e.to_string(),
                            }
                            .to_json(),
                        );
                        drop(tx);
                        let _ = writer.await;
                        return;
                    }
                }
            }
            _ => {
                let _ = tx.send(
                    ServerMessage::Error {
                        message: "first message must be authenticate".into(),
                    }
                    .to_json(),
                );
                drop(tx);
                let _ = writer.await;
                return;
            }
        },
        _ => {
            writer.abort();
            return;
        }
    };

    let conn_id = hub.register_connection();
    debug!(conn = conn_id, subject = %identity.subject, "client authenticated");
    let _ = tx.send(
        ServerMessage::Authenticated {
            subject: identity.subject.clone(),
        }
        .to_json(),
    );

    while let Some(msg_result) = ws_receiver.next().await {
        let msg = match msg_result {
            Ok(msg) => msg,
            Err(e) => {
                warn!(conn = conn_id, "WebSocket receive error: {e}");
                break;
            }
        };
        match msg {
            Message::Text(text) => match parse_client_message(&text) {
                Ok(ClientMessage::SubscribeLoan { loan_id }) => {
                    hub.subscribe(conn_id, loan_id, tx.clone());
                }
                Ok(ClientMessage::Authenticate { .. }) => {
                    // Already authenticated; ignore.
                }
                Err(e) => {
                    let _ = tx.send(
                        ServerMessage::Error {
                            message: format!("invalid message: {e}"),
                        }
                        .to_json(),
                    );
                }
            },
            Message::Close(_) => {
                debug!(conn = conn_id, "client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {
                // axum answers pings at the protocol level.
            }
            _ => {}
        }
    }

    hub.unsubscribe(conn_id);
    drop(tx);
    let _ = writer.await;
    debug!(conn = conn_id, "WebSocket client disconnected");
}

fn parse_client_message(text: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(text)
}
