use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message, WebSocketStream};

use common::games::snake::{DecisionSink, InboundMessage, OutboundMessage};
use common::log;

use crate::games::snake::SessionCommand;
use crate::server_config::DECISION_BUFFER;

/// Session-side handle to the decision service connection.
///
/// While the service is unreachable every emitted message is dropped.
#[derive(Clone)]
pub struct DecisionLink {
    outbound: mpsc::Sender<OutboundMessage>,
    connected: Arc<AtomicBool>,
}

impl DecisionLink {
    pub fn offline() -> Self {
        let (outbound, _) = mpsc::channel(1);
        Self {
            outbound,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl DecisionSink for DecisionLink {
    fn emit(&self, message: OutboundMessage) {
        if !self.is_connected() {
            return;
        }
        if self.outbound.try_send(message).is_err() {
            log!("Decision service is not keeping up, dropping a message");
        }
    }
}

enum LinkEnd {
    SessionClosed,
    Disconnected(String),
}

pub fn spawn_decision_client(
    url: String,
    retry: Duration,
    commands: mpsc::Sender<SessionCommand>,
) -> DecisionLink {
    let (outbound, outbound_rx) = mpsc::channel(DECISION_BUFFER);
    let connected = Arc::new(AtomicBool::new(false));
    tokio::spawn(run_decision_client(url, retry, outbound_rx, connected.clone(), commands));
    DecisionLink { outbound, connected }
}

async fn run_decision_client(
    url: String,
    retry: Duration,
    mut outbound: mpsc::Receiver<OutboundMessage>,
    connected: Arc<AtomicBool>,
    commands: mpsc::Sender<SessionCommand>,
) {
    let mut last_error: Option<String> = None;

    loop {
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                log!("Connected to decision service at {}", url);
                last_error = None;
                while outbound.try_recv().is_ok() {}
                connected.store(true, Ordering::SeqCst);

                let end = pump(stream, &mut outbound, &commands).await;
                connected.store(false, Ordering::SeqCst);
                match end {
                    LinkEnd::SessionClosed => break,
                    LinkEnd::Disconnected(reason) => log!("Decision service disconnected: {}", reason),
                }
            }
            Err(e) => {
                let error = e.to_string();
                if last_error.as_deref() != Some(error.as_str()) {
                    log!("Decision service unavailable at {}: {}", url, error);
                    last_error = Some(error);
                }
            }
        }

        if commands.is_closed() {
            break;
        }
        tokio::time::sleep(retry).await;
    }
}

async fn pump<S>(
    stream: WebSocketStream<S>,
    outbound: &mut mpsc::Receiver<OutboundMessage>,
    commands: &mpsc::Sender<SessionCommand>,
) -> LinkEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut ws_sender, mut ws_receiver) = stream.split();

    loop {
        tokio::select! {
            message = outbound.recv() => {
                let Some(message) = message else {
                    let _ = ws_sender.close().await;
                    return LinkEnd::SessionClosed;
                };
                match message.to_json() {
                    Ok(text) => {
                        if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                            return LinkEnd::Disconnected(e.to_string());
                        }
                    }
                    Err(e) => log!("{}", e),
                }
            }
            frame = ws_receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let command = match InboundMessage::from_json(text.as_str()) {
                        Ok(InboundMessage::AiDecision(decision)) => SessionCommand::AiDecision(decision.action),
                        Ok(InboundMessage::AiStatsUpdate(stats)) => SessionCommand::AiStats(stats),
                        Err(e) => {
                            log!("{}", e);
                            continue;
                        }
                    };
                    if commands.send(command).await.is_err() {
                        return LinkEnd::SessionClosed;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    return LinkEnd::Disconnected("connection closed".to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return LinkEnd::Disconnected(e.to_string()),
            }
        }
    }
}
