//! Business logic services (use cases).
//!
//! Services orchestrate repository calls, the embed compiler and business
//! rules. They depend on traits (ports) -- never on concrete infrastructure
//! implementations.

pub mod chatbot;
pub mod hash;
