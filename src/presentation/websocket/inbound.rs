//! Inbound frame dispatch.
//!
//! The web client does not currently send application frames; the reader still
//! parses `{"channel", "payload"}` frames and routes them here so new inbound
//! channels only need a handler.

use std::sync::Arc;

use async_trait::async_trait;

use super::connection::Connection;
use super::gateway::Gateway;
use super::messages::InboundFrame;

#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn handle(&self, gateway: &Gateway, connection: &Arc<Connection>, frame: InboundFrame);
}

/// Default handler: logs and discards every inbound frame
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreInbound;

#[async_trait]
impl InboundHandler for IgnoreInbound {
    async fn handle(&self, _gateway: &Gateway, connection: &Arc<Connection>, frame: InboundFrame) {
        tracing::debug!(
            user_id = %connection.user_id(),
            connection_id = %connection.id(),
            channel = %frame.channel,
            "Unhandled inbound channel"
        );
    }
}
