//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::domain::{PeerKeyResolver, SessionResolver};
use crate::infrastructure::cache::{InMemoryChatDirectory, InMemorySessionStore};
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::Gateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub sessions: Arc<dyn SessionResolver>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        sessions: Arc<dyn SessionResolver>,
        peers: Arc<dyn PeerKeyResolver>,
    ) -> Self {
        let gateway = Arc::new(Gateway::new(peers, settings.websocket.queue_capacity));
        Self {
            gateway,
            sessions,
            settings: Arc::new(settings),
        }
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let sessions = Arc::new(InMemorySessionStore::new());
        let chats = Arc::new(InMemoryChatDirectory::new());
        let addr = settings.server_addr();

        // Create app state
        let state = AppState::new(settings, sessions, chats);
        tracing::info!(
            queue_capacity = state.settings.websocket.queue_capacity,
            "WebSocket gateway created"
        );

        // Build router with middleware
        let router = routes::create_router(state.clone())
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&state.settings.cors));

        // Bind to address
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            state,
        })
    }

    /// Run the server until Ctrl+C, then close every live connection
    pub async fn run_until_stopped(self) -> Result<()> {
        let gateway = self.state.gateway.clone();
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal(gateway))
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal(gateway: Arc<Gateway>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
    gateway.shutdown().await;
}
