//! SHA-256 fingerprints of compiled embed artifacts.

use sha2::{Digest, Sha256};

use formchat_core::service::hash::Fingerprinter;
use formchat_types::embed::EmbedArtifact;

/// Fingerprints an artifact pair with SHA-256, lowercase hex.
///
/// Each snippet is fed with a big-endian length prefix, so shifting bytes
/// from the popup into the iframe cannot produce the same digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Fingerprinter;

impl Fingerprinter for Sha256Fingerprinter {
    fn fingerprint(&self, artifact: &EmbedArtifact) -> String {
        let mut hasher = Sha256::new();
        for snippet in [&artifact.popup, &artifact.iframe] {
            hasher.update((snippet.len() as u64).to_be_bytes());
            hasher.update(snippet.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formchat_core::embed::compile;
    use formchat_types::chatbot::{ChatbotConfig, Customization, EmbedType};

    const BASE: &str = "https://chat.example.com";

    fn artifact(customization: Customization) -> EmbedArtifact {
        let config = ChatbotConfig {
            chatbot_id: "bot_1a2b3c4d5e6f".to_string(),
            name: "Contact".to_string(),
            google_form_url: "https://forms.gle/abc".to_string(),
            embed_type: EmbedType::Popup,
            customization,
            is_active: true,
        };
        compile(&config, BASE).unwrap()
    }

    #[test]
    fn test_compiled_artifact_digest_is_lowercase_hex() {
        let digest = Sha256Fingerprinter.fingerprint(&artifact(Customization::default()));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_recompiling_unchanged_config_keeps_digest() {
        let a = Sha256Fingerprinter.fingerprint(&artifact(Customization::default()));
        let b = Sha256Fingerprinter.fingerprint(&artifact(Customization::default()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_customization_changes_move_digest() {
        let base = Sha256Fingerprinter.fingerprint(&artifact(Customization::default()));

        // Color only reaches the popup literal.
        let recolored = Sha256Fingerprinter.fingerprint(&artifact(Customization {
            primary_color: "#000000".to_string(),
            ..Default::default()
        }));
        // Size reaches the iframe height as well.
        let resized = Sha256Fingerprinter.fingerprint(&artifact(Customization {
            size: "large".to_string(),
            ..Default::default()
        }));

        assert_ne!(base, recolored);
        assert_ne!(base, resized);
        assert_ne!(recolored, resized);
    }

    #[test]
    fn test_snippet_boundary_is_part_of_digest() {
        let compiled = artifact(Customization::default());
        let mut shifted = compiled.clone();
        let moved = shifted.popup.pop().unwrap();
        shifted.iframe.insert(0, moved);

        assert_ne!(
            Sha256Fingerprinter.fingerprint(&compiled),
            Sha256Fingerprinter.fingerprint(&shifted)
        );
    }
}
