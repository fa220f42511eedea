//! Shared domain types for FormChat.
//!
//! This crate contains the core domain types used across the FormChat platform:
//! chatbot configuration, compiled embed artifacts, widget bootstrap options,
//! usage counters, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chatbot;
pub mod config;
pub mod embed;
pub mod error;
pub mod stats;
