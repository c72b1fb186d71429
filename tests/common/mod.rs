//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use axum_test::TestServer;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::task::JoinHandle;

use social_fanout::config::Settings;
use social_fanout::domain::{AuthenticatedSession, UserId};
use social_fanout::infrastructure::cache::{InMemoryChatDirectory, InMemorySessionStore};
use social_fanout::presentation::http::routes::create_router;
use social_fanout::presentation::websocket::{serve_connection, Connection, Gateway};
use social_fanout::startup::AppState;

/// How long a client waits for a frame before giving up
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// How long a client listens to conclude nothing more is coming
pub const QUIET_PERIOD: Duration = Duration::from_millis(100);

/// Test application builder
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub sessions: Arc<InMemorySessionStore>,
}

impl TestApp {
    /// Create a new test application with in-memory dependencies
    pub fn new() -> Self {
        let settings = Settings::from_defaults().unwrap();
        let sessions = Arc::new(InMemorySessionStore::new());
        let chats = Arc::new(InMemoryChatDirectory::new());
        let state = AppState::new(settings, sessions.clone(), chats);
        let server = TestServer::new(create_router(state.clone())).unwrap();

        Self {
            server,
            state,
            sessions,
        }
    }

    /// Register a login session under `token`
    pub fn login(&self, token: &str, user_id: i64) {
        self.sessions
            .insert(token, AuthenticatedSession::new(user_id, token));
    }
}

/// Gateway keyed by user id for status events
pub fn gateway(queue_capacity: usize) -> Arc<Gateway> {
    Arc::new(Gateway::new(
        Arc::new(InMemoryChatDirectory::new()),
        queue_capacity,
    ))
}

/// A browser tab wired to the gateway through in-memory channels
pub struct TestClient {
    pub connection: Arc<Connection>,
    outbound: mpsc::UnboundedReceiver<Message>,
    inbound: mpsc::UnboundedSender<Result<Message, String>>,
    task: JoinHandle<()>,
}

impl TestClient {
    /// Open, register and serve a connection for `user` on `session`
    pub async fn connect(gateway: &Arc<Gateway>, user: i64, session: &str) -> Self {
        let connection = gateway.open_connection(UserId(user), session.into());
        gateway.connect(&connection).await;

        let (sink, outbound) = mpsc::unbounded::<Message>();
        let (inbound, stream) = mpsc::unbounded::<Result<Message, String>>();
        let task = tokio::spawn(serve_connection(
            gateway.clone(),
            connection.clone(),
            sink,
            stream,
        ));

        Self {
            connection,
            outbound,
            inbound,
            task,
        }
    }

    /// Next text frame parsed as JSON
    pub async fn recv_json(&mut self) -> Value {
        let frame = tokio::time::timeout(RECV_TIMEOUT, self.outbound.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed before a frame arrived");
        match frame {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    /// Every frame that arrives until the socket goes quiet
    pub async fn drain_json(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(Some(frame)) = tokio::time::timeout(QUIET_PERIOD, self.outbound.next()).await {
            if let Message::Text(text) = frame {
                frames.push(serde_json::from_str(text.as_str()).unwrap());
            }
        }
        frames
    }

    /// Assert no frame arrives within the quiet period
    pub async fn assert_silent(&mut self) {
        let frames = self.drain_json().await;
        assert!(frames.is_empty(), "expected silence, got {:?}", frames);
    }

    /// Send a text frame as the browser would
    pub async fn send_text(&mut self, text: &str) {
        self.inbound.send(Ok(Message::Text(text.into()))).await.unwrap();
    }

    /// Send a close frame as the browser would
    pub async fn send_close(&mut self) {
        self.inbound.send(Ok(Message::Close(None))).await.unwrap();
    }

    /// Stop accepting frames so the next write fails
    pub fn break_transport(&mut self) {
        self.outbound.close();
    }

    /// Wait until both connection loops have stopped
    pub async fn finished(self) {
        tokio::time::timeout(RECV_TIMEOUT, self.task)
            .await
            .expect("connection did not shut down")
            .unwrap();
    }
}

/// `status` events about `user` in arrival order
pub fn statuses_for(frames: &[Value], user: i64) -> Vec<bool> {
    frames
        .iter()
        .filter(|frame| frame["channel"] == "status" && frame["user"] == user)
        .map(|frame| frame["status"].as_bool().unwrap())
        .collect()
}
