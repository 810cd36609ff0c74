//! Common test utilities for taskwire-client integration tests
//!
//! Provides a mock task service that speaks just enough of the wire
//! protocol for client testing: it accepts any number of connections,
//! captures every outbound frame (authentication included) for assertions,
//! and replies per message through a handler closure.

// not every test binary uses every helper
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// What the mock service does with one inbound frame
pub enum MockReply {
    /// No response
    None,
    /// Send one text frame back
    Text(String),
    /// Send several text frames back, in order
    Texts(Vec<String>),
    /// Close this connection with a clean close frame
    Close,
    /// Drop the TCP connection without a closing handshake
    Drop,
}

/// Mock task service for client testing
pub struct MockTaskServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    message_rx: mpsc::Receiver<String>,
}

impl MockTaskServer {
    /// Start a mock service that never replies.
    #[allow(dead_code)]
    pub async fn silent() -> Self {
        Self::with_handler(|_| async { MockReply::None }).await
    }

    /// Start a mock service with a per-message handler.
    ///
    /// Every received text frame (the authentication frame included) is
    /// forwarded to the capture channel before the handler runs.
    pub async fn with_handler<F, Fut>(handler: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = MockReply> + Send,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (msg_tx, msg_rx) = mpsc::channel::<String>(100);
        let handler = Arc::new(handler);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { break };
                        let msg_tx = msg_tx.clone();
                        let handler = Arc::clone(&handler);

                        tokio::spawn(async move {
                            let Ok(ws_stream) = accept_async(stream).await else { return };
                            let (mut write, mut read) = ws_stream.split();

                            while let Some(Ok(message)) = read.next().await {
                                match message {
                                    Message::Text(text) => {
                                        let _ = msg_tx.send(text.clone()).await;
                                        match handler(text).await {
                                            MockReply::None => {}
                                            MockReply::Text(reply) => {
                                                let _ = write.send(Message::Text(reply)).await;
                                            }
                                            MockReply::Texts(replies) => {
                                                for reply in replies {
                                                    let _ = write.send(Message::Text(reply)).await;
                                                }
                                            }
                                            MockReply::Close => {
                                                let _ = write.send(Message::Close(None)).await;
                                                return;
                                            }
                                            MockReply::Drop => return,
                                        }
                                    }
                                    Message::Ping(payload) => {
                                        let _ = write.send(Message::Pong(payload)).await;
                                    }
                                    Message::Close(_) => return,
                                    _ => {}
                                }
                            }
                        });
                    }
                }
            }
        });

        // wait for the listener to be ready
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        Self {
            addr,
            shutdown_tx,
            message_rx: msg_rx,
        }
    }

    /// WebSocket URL for connecting to this service
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Wait for the next frame the service received.
    pub async fn wait_for_message(&mut self) -> Option<String> {
        tokio::time::timeout(tokio::time::Duration::from_secs(5), self.message_rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Shut the service down.
    #[allow(dead_code)]
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}

/// Parse an outbound client frame into its single task object.
pub fn sent_task(frame: &str) -> serde_json::Value {
    let value: serde_json::Value = serde_json::from_str(frame).unwrap();
    value.as_array().unwrap()[0].clone()
}

/// Whether an outbound frame is the authentication frame.
pub fn is_auth_frame(frame: &str) -> bool {
    sent_task(frame)["taskType"] == "authentication"
}

/// Build a `{"data":[...]}` reply frame.
pub fn data_frame(items: Vec<serde_json::Value>) -> String {
    serde_json::json!({ "data": items }).to_string()
}

/// One image result item addressed to `task_uuid`.
pub fn image_item(task_uuid: &str, image_uuid: &str) -> serde_json::Value {
    serde_json::json!({
        "taskType": "imageInference",
        "taskUUID": task_uuid,
        "imageUUID": image_uuid,
        "imageURL": format!("https://img.example/{image_uuid}.png")
    })
}

/// A service error frame addressed to `task_uuid`.
pub fn error_frame(task_uuid: &str, message: &str, error_id: &str) -> String {
    serde_json::json!({
        "error": message,
        "errorId": error_id,
        "taskUUID": task_uuid
    })
    .to_string()
}
