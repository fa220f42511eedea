//! Business logic and repository trait definitions for FormChat.
//!
//! This crate holds the embed compiler, the headless widget runtime, and the
//! "ports" (repository and hashing traits) that the infrastructure layer
//! implements. It depends only on `formchat-types` -- never on
//! `formchat-infra` or any database/IO crate.

pub mod embed;
pub mod repository;
pub mod service;
pub mod widget;
