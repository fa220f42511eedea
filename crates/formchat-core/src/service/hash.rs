//! Artifact fingerprinting port.
//!
//! The service layer only needs a stable digest of a compiled artifact pair;
//! the digest algorithm is an infra concern (`Sha256Fingerprinter`).

use formchat_types::embed::EmbedArtifact;

/// Digest of a compiled artifact pair.
///
/// Two artifacts get the same fingerprint exactly when both snippets are
/// byte-identical, so the value works as an HTTP entity tag.
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, artifact: &EmbedArtifact) -> String;
}
