//! In-process WebSocket peer for exercising the chat client end to end.

use futures_util::{SinkExt, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum ServerAction {
    Text(String),
    Close { code: u16, reason: String },
    Drop,
}

/// What the test server saw from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerObserved {
    Text(String),
    /// A close frame arrived.
    Closed,
    /// The socket went away without a close frame.
    Disconnected,
}

/// Accepts a single client on a loopback port and lets the test script the
/// server side of the conversation.
pub struct TestServer {
    pub endpoint: String,
    actions: mpsc::UnboundedSender<ServerAction>,
    observed: mpsc::UnboundedReceiver<ServerObserved>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback listener");
        let addr = listener.local_addr().expect("listener address");
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<ServerAction>();
        let (observed_tx, observed_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let Ok((tcp, _)) = listener.accept().await else {
                return;
            };
            let Ok(ws) = tokio_tungstenite::accept_async(tcp).await else {
                return;
            };
            let (mut sink, mut source) = ws.split();

            loop {
                tokio::select! {
                    action = action_rx.recv() => match action {
                        Some(ServerAction::Text(text)) => {
                            if sink.send(Message::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        Some(ServerAction::Close { code, reason }) => {
                            let frame = CloseFrame {
                                code: CloseCode::from(code),
                                reason: reason.into(),
                            };
                            let _ = sink.send(Message::Close(Some(frame))).await;
                        }
                        Some(ServerAction::Drop) | None => break,
                    },
                    incoming = source.next() => match incoming {
                        Some(Ok(Message::Text(text))) => {
                            let _ = observed_tx.send(ServerObserved::Text(text.as_str().to_owned()));
                        }
                        Some(Ok(Message::Close(_))) => {
                            let _ = observed_tx.send(ServerObserved::Closed);
                            break;
                        }
                        Some(Err(_)) | None => {
                            let _ = observed_tx.send(ServerObserved::Disconnected);
                            break;
                        }
                        Some(Ok(_)) => {}
                    },
                }
            }
        });

        Self {
            endpoint: format!("ws://{addr}/api/chat/ws"),
            actions: action_tx,
            observed: observed_rx,
        }
    }

    pub fn reply(&self, text: &str) {
        let _ = self.actions.send(ServerAction::Text(text.to_string()));
    }

    pub fn close(&self, code: u16, reason: &str) {
        let _ = self.actions.send(ServerAction::Close {
            code,
            reason: reason.to_string(),
        });
    }

    /// Drop the socket without a closing handshake.
    pub fn drop_connection(&self) {
        let _ = self.actions.send(ServerAction::Drop);
    }

    pub async fn next_observed(&mut self) -> ServerObserved {
        within(self.observed.recv())
            .await
            .expect("test server stopped before observing anything")
    }
}

/// A loopback endpoint nothing is listening on.
pub async fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("ws://{addr}/api/chat/ws")
}

pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(TEST_TIMEOUT, future)
        .await
        .expect("timed out waiting on chat connection")
}
