use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use common::log;

use crate::games::snake::{SessionCommand, ViewEvent, ViewerCommand};
use crate::server_config::VIEWER_BUFFER;
use crate::web_server::WebServerState;

pub async fn handle_websocket(socket: WebSocket, state: WebServerState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (tx, mut rx) = mpsc::channel::<ViewEvent>(VIEWER_BUFFER);

    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event.to_json() {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => log!("{}", e),
            }
        }
    });

    let viewer_id = state.viewers.register(tx).await;
    log!("Viewer connected: {} ({} watching)", viewer_id, state.viewers.viewer_count().await);

    if state.commands.send(SessionCommand::Refresh).await.is_err() {
        log!("Game session is gone, closing viewer {}", viewer_id);
    } else {
        while let Some(result) = ws_receiver.next().await {
            let text = match result {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    log!("Viewer {} socket error: {}", viewer_id, e);
                    break;
                }
            };

            let command = match ViewerCommand::from_json(text.as_str()) {
                Ok(command) => command,
                Err(e) => {
                    log!("Viewer {}: {}", viewer_id, e);
                    continue;
                }
            };

            if state.commands.send(SessionCommand::Viewer(command)).await.is_err() {
                break;
            }
        }
    }

    state.viewers.unregister(&viewer_id).await;
    send_task.abort();
    log!("Viewer disconnected: {}", viewer_id);
}
