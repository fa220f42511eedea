//! Embed artifacts and the widget bootstrap surface.
//!
//! `EmbedArtifact` is what the compiler hands to the operator. `BootstrapOptions`
//! is what the popup snippet hands to the widget loader on the host page; its
//! keys are camelCase because they are written as a script literal.
//!
//! The bootstrap literal is hand-editable host-page input, so a key of the
//! wrong JSON type reads as absent instead of failing the whole call.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::chatbot::{Position, WidgetSize};

/// The two copy-pasteable snippets compiled from one chatbot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedArtifact {
    /// Loader script reference plus initialization call.
    pub popup: String,
    /// A single inline frame element.
    pub iframe: String,
}

/// Customization as carried by the bootstrap call. Every key is optional and
/// merged over built-in defaults field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_string"
    )]
    pub primary_color: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_string"
    )]
    pub secondary_color: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_string"
    )]
    pub bot_name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_string"
    )]
    pub welcome_message: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_string"
    )]
    pub position: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_string"
    )]
    pub size: Option<String>,
}

/// Arguments of the loader's `init` entry point.
///
/// Everything is optional at the type level so that a malformed call can be
/// inspected and rejected with a diagnostic instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BootstrapOptions {
    #[serde(deserialize_with = "lenient_string")]
    pub chatbot_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub api_base_url: Option<String>,
    #[serde(deserialize_with = "lenient_config")]
    pub config: Option<WidgetConfig>,
}

/// Keep string values; anything else (number, bool, object, null) is absent.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Keep objects; a non-object `config` is treated as no overrides.
fn lenient_config<'de, D: Deserializer<'de>>(d: D) -> Result<Option<WidgetConfig>, D::Error> {
    match Value::deserialize(d)? {
        value @ Value::Object(_) => WidgetConfig::deserialize(value)
            .map(Some)
            .map_err(D::Error::custom),
        _ => Ok(None),
    }
}

/// Customization after default-filling and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveCustomization {
    pub primary_color: String,
    pub secondary_color: String,
    pub bot_name: String,
    pub welcome_message: String,
    pub position: Position,
    pub size: WidgetSize,
}

impl EffectiveCustomization {
    /// Convert back into the bootstrap literal form with every key present.
    pub fn to_widget_config(&self) -> WidgetConfig {
        WidgetConfig {
            primary_color: Some(self.primary_color.clone()),
            secondary_color: Some(self.secondary_color.clone()),
            bot_name: Some(self.bot_name.clone()),
            welcome_message: Some(self.welcome_message.clone()),
            position: Some(self.position.to_string()),
            size: Some(self.size.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_options_camel_case() {
        let json = r##"{"chatbotId":"bot_1","apiBaseUrl":"https://api.example.com","config":{"position":"bottom-left","primaryColor":"#000"}}"##;
        let opts: BootstrapOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.chatbot_id.as_deref(), Some("bot_1"));
        assert_eq!(opts.api_base_url.as_deref(), Some("https://api.example.com"));
        let config = opts.config.unwrap();
        assert_eq!(config.position.as_deref(), Some("bottom-left"));
        assert_eq!(config.primary_color.as_deref(), Some("#000"));
        assert!(config.bot_name.is_none());
    }

    #[test]
    fn test_bootstrap_options_tolerates_missing_keys() {
        let opts: BootstrapOptions = serde_json::from_str("{}").unwrap();
        assert!(opts.chatbot_id.is_none());
        assert!(opts.config.is_none());
    }

    #[test]
    fn test_widget_config_skips_absent_keys() {
        let config = WidgetConfig {
            size: Some("large".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&config).unwrap(), r#"{"size":"large"}"#);
    }

    #[test]
    fn test_mistyped_config_keys_read_as_absent() {
        let json = r#"{"chatbotId":"bot_a","config":{"primaryColor":123,"botName":["x"],"position":"bottom-left","size":null}}"#;
        let opts: BootstrapOptions = serde_json::from_str(json).unwrap();
        let config = opts.config.unwrap();
        assert!(config.primary_color.is_none());
        assert!(config.bot_name.is_none());
        assert!(config.size.is_none());
        assert_eq!(config.position.as_deref(), Some("bottom-left"));
    }

    #[test]
    fn test_mistyped_top_level_keys_read_as_absent() {
        let json = r#"{"chatbotId":42,"apiBaseUrl":"https://chat.example.com","config":"dark"}"#;
        let opts: BootstrapOptions = serde_json::from_str(json).unwrap();
        assert!(opts.chatbot_id.is_none());
        assert_eq!(opts.api_base_url.as_deref(), Some("https://chat.example.com"));
        assert!(opts.config.is_none());
    }
}
