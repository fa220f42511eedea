//! Cryptographic operations for FormChat.
//!
//! - `hash`: SHA-256 fingerprints of compiled embed artifacts (`Sha256Fingerprinter`)

pub mod hash;
