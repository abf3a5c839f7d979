//! Axum HTTP API server.
//!
//! This crate provides:
//! - The upload → detect → enhance → persist request pipeline
//! - Remote enhancement with retry, local filter fallback
//! - CORS, request-id and request-logging middleware
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
