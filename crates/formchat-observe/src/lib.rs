//! Observability for FormChat: subscriber setup and shared span/target names.

pub mod attrs;
pub mod tracing_setup;
