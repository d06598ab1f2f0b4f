// WebSocket transport
//
// Each session runs as a tokio task that opens the socket, forwards every
// text frame, and reports exactly one Closed event when it ends. The task
// never reconnects by itself; the connection manager decides that.

use super::connection::{Connector, SessionId, TransportEvent, TransportSender, TransportSession};
use super::error::FeedError;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Connector backed by tokio-tungstenite
#[derive(Debug, Default)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WsConnector {
    fn connect(
        &mut self,
        endpoint: &Url,
        session: SessionId,
        events: TransportSender,
    ) -> Box<dyn TransportSession> {
        let endpoint = endpoint.to_string();
        let task = tokio::spawn(async move {
            let reason = run_session(&endpoint, session, &events)
                .await
                .err()
                .map(|e| e.to_string());
            let _ = events.send((session, TransportEvent::Closed { reason }));
        });
        Box::new(WsSession { task: Some(task) })
    }
}

/// Handle to a running session task
pub struct WsSession {
    task: Option<JoinHandle<()>>,
}

impl TransportSession for WsSession {
    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for WsSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Drive one socket until it closes
///
/// Every ending is reported as an error describing it, except when the
/// receiving side has gone away.
async fn run_session(
    endpoint: &str,
    session: SessionId,
    events: &TransportSender,
) -> Result<(), FeedError> {
    let (mut stream, _response) = tokio_tungstenite::connect_async(endpoint)
        .await
        .map_err(|e| FeedError::Transport(format!("connect failed: {}", e)))?;
    tracing::debug!(session, "websocket handshake complete");

    if events.send((session, TransportEvent::Opened)).is_err() {
        return Ok(());
    }

    while let Some(item) = stream.next().await {
        let text = match item {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    tracing::debug!(session, "ignoring non-UTF-8 binary frame");
                    continue;
                }
            },
            Ok(Message::Close(frame)) => {
                tracing::debug!(session, ?frame, "remote closed websocket");
                return match frame {
                    Some(frame) if !frame.reason.is_empty() => {
                        Err(FeedError::Transport(format!("closed by server: {}", frame.reason)))
                    }
                    _ => Err(FeedError::Transport("closed by server".to_string())),
                };
            }
            // Ping/pong are answered by tungstenite itself
            Ok(_) => continue,
            Err(e) => return Err(FeedError::Transport(format!("read error: {}", e))),
        };

        if events.send((session, TransportEvent::Text(text))).is_err() {
            // Receiver is gone; the app is shutting down
            return Ok(());
        }
    }

    Err(FeedError::Transport("connection lost".to_string()))
}
