//! HTTP Layer
//!
//! Routes, extractors and operational endpoints.

pub mod extractors;
pub mod handlers;
pub mod routes;
