//! # Social Fan-out Library
//!
//! Real-time delivery core for a social network:
//! - WebSocket gateway holding every live browser tab per user
//! - Per-connection bounded send queue drained by a dedicated writer
//! - Fan-out of chat, notification, new-post and new-chat events
//! - Online/offline presence broadcast on first and last connection
//!
//! ## Architecture
//!
//! - **Domain Layer**: identifiers and the session / peer-key ports
//! - **Infrastructure Layer**: in-memory port implementations and metrics
//! - **Presentation Layer**: HTTP routes and the WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! social_fanout/
//! +-- config/         Configuration management
//! +-- domain/         Value objects and service traits
//! +-- infrastructure/ In-memory stores, Prometheus metrics
//! +-- presentation/   HTTP routes, middleware, WebSocket gateway
//! +-- shared/         Common utilities (errors)
//! ```

// Configuration module
pub mod config;

// Domain layer - Identifiers and ports
pub mod domain;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
