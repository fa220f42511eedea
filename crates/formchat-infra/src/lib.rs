//! Infrastructure layer for FormChat.
//!
//! Contains implementations of the ports defined in `formchat-core`: SQLite
//! storage, SHA-256 hashing, the `config.toml` loader and data directory
//! resolution.

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod sqlite;
