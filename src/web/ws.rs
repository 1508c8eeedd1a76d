//! # Dashboard WebSocket Stream
//!
//! Pushes a JSON frame of aggregate counters to each subscriber on
//! connect, after every appended event, and on a periodic keepalive
//! tick. Frames carry `{active_workflows, active_conflicts,
//! active_coordinations, cache_stats}`.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::web::state::AppState;

/// GET /ws/workflows
pub async fn ws_workflows(State(state): State<AppState>, upgrade: WebSocketUpgrade) -> Response {
    upgrade.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut events = state.engine.publisher().subscribe();
    let mut keepalive = tokio::time::interval(Duration::from_millis(
        state.config.web.dashboard_push_interval_ms,
    ));

    debug!("dashboard subscriber connected");

    // Initial frame so the dashboard renders without waiting for traffic
    if send_frame(&mut socket, &state).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            _ = keepalive.tick() => {
                if send_frame(&mut socket, &state).await.is_err() {
                    break;
                }
            }
            event = events.recv() => {
                match event {
                    Ok(_) => {
                        if send_frame(&mut socket, &state).await.is_err() {
                            break;
                        }
                    }
                    // Missed frames are fine; the next frame carries totals
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "dashboard subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "dashboard socket error");
                        break;
                    }
                }
            }
        }
    }

    debug!("dashboard subscriber disconnected");
}

async fn send_frame(socket: &mut WebSocket, state: &AppState) -> Result<(), axum::Error> {
    let frame = state.engine.dashboard_frame();
    let text = match serde_json::to_string(&frame) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "failed to serialize dashboard frame");
            return Ok(());
        }
    };
    socket.send(Message::Text(text)).await
}
