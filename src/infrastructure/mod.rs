//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - In-memory session and chat directories standing in for the relational store
//! - Prometheus metrics

pub mod cache;
pub mod metrics;
