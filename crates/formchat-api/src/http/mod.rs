//! HTTP/REST API layer for FormChat.
//!
//! Axum-based REST API at `/api/v1/` with envelope responses, plus the
//! conversation frame shell at `/embed/{id}` and the loader assets.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
