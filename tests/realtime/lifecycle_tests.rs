//! Connection teardown and inbound frame dispatch

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use social_fanout::domain::UserId;
use social_fanout::infrastructure::cache::InMemoryChatDirectory;
use social_fanout::presentation::websocket::{
    Connection, ConnectionState, Envelope, Gateway, InboundFrame, InboundHandler,
};
use tokio::sync::mpsc;

use crate::common::{gateway, statuses_for, TestClient};

#[tokio::test]
async fn test_close_frame_tears_connection_down() {
    let gateway = gateway(10);
    let mut observer = TestClient::connect(&gateway, 1, "obs").await;
    let mut client = TestClient::connect(&gateway, 2, "tab").await;
    let connection = client.connection.clone();

    client.send_close().await;
    client.finished().await;

    assert_eq!(connection.state(), ConnectionState::Closed);
    assert_eq!(gateway.connection_count(), 1);
    assert_eq!(
        statuses_for(&observer.drain_json().await, 2),
        vec![true, false]
    );
}

#[tokio::test]
async fn test_shutdown_stops_every_connection() {
    let gateway = gateway(10);
    let a = TestClient::connect(&gateway, 1, "a").await;
    let b = TestClient::connect(&gateway, 2, "b").await;

    gateway.shutdown().await;

    a.finished().await;
    b.finished().await;
    assert_eq!(gateway.connection_count(), 0);
    assert_eq!(gateway.online_user_count(), 0);
}

#[tokio::test]
async fn test_closed_connection_receives_nothing() {
    let gateway = gateway(10);
    let mut client = TestClient::connect(&gateway, 3, "tab").await;
    let connection = client.connection.clone();
    client.send_close().await;
    client.finished().await;

    assert!(!connection.enqueue(Arc::new(Envelope::NewPost { payload: json!({}) })));
    assert_eq!(gateway.push_new_post(UserId(3), &json!({})), 0);
}

struct Recorder(mpsc::UnboundedSender<(UserId, InboundFrame)>);

#[async_trait]
impl InboundHandler for Recorder {
    async fn handle(&self, _gateway: &Gateway, connection: &Arc<Connection>, frame: InboundFrame) {
        let _ = self.0.send((connection.user_id(), frame));
    }
}

#[tokio::test]
async fn test_inbound_frames_reach_handler() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let gateway = Arc::new(
        Gateway::new(Arc::new(InMemoryChatDirectory::new()), 10)
            .with_inbound_handler(Arc::new(Recorder(tx))),
    );
    let mut client = TestClient::connect(&gateway, 4, "tab").await;

    client.send_text("not json").await;
    client
        .send_text(r#"{"channel":"typing","payload":{"chat":9}}"#)
        .await;

    let (user, frame) = rx.recv().await.unwrap();
    assert_eq!(user, UserId(4));
    assert_eq!(frame.channel, "typing");
    assert_eq!(frame.payload, json!({"chat": 9}));
    assert!(gateway.is_user_online(UserId(4)));
}

#[tokio::test]
async fn test_logout_closes_only_that_session() {
    let gateway = gateway(10);
    let mut observer = TestClient::connect(&gateway, 1, "obs").await;
    let phone = TestClient::connect(&gateway, 2, "phone").await;
    let phone_second_tab = TestClient::connect(&gateway, 2, "phone").await;
    let mut laptop = TestClient::connect(&gateway, 2, "laptop").await;

    let closed = gateway
        .disconnect_session(UserId(2), &"phone".into())
        .await;

    assert_eq!(closed, 2);
    phone.finished().await;
    phone_second_tab.finished().await;
    assert_eq!(gateway.session_count_for(UserId(2)), 1);
    assert_eq!(
        gateway.push_new_post(UserId(2), &json!({"id": 1})),
        1
    );
    assert_eq!(
        laptop.recv_json().await,
        json!({"channel": "new-post", "payload": {"id": 1}})
    );
    assert_eq!(statuses_for(&observer.drain_json().await, 2), vec![true]);

    assert_eq!(
        gateway
            .disconnect_session(UserId(2), &"laptop".into())
            .await,
        1
    );
    laptop.finished().await;
    assert_eq!(statuses_for(&observer.drain_json().await, 2), vec![false]);
    assert!(!gateway.is_user_online(UserId(2)));
}

#[tokio::test]
async fn test_logout_of_unknown_session_is_noop() {
    let gateway = gateway(10);
    let _tab = TestClient::connect(&gateway, 3, "tab").await;

    assert_eq!(
        gateway.disconnect_session(UserId(3), &"other".into()).await,
        0
    );
    assert_eq!(
        gateway.disconnect_session(UserId(4), &"tab".into()).await,
        0
    );
    assert!(gateway.is_user_online(UserId(3)));
}
