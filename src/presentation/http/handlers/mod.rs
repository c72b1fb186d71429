//! HTTP Handlers
//!
//! Operational endpoints. Application CRUD handlers live in the main backend
//! and reach the gateway through `AppState`.

pub mod health;
