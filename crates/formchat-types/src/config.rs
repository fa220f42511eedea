//! Global configuration types for FormChat.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! public API address baked into embed artifacts, where the loader assets are
//! served from, and list pagination defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the FormChat server and CLI.
///
/// Loaded from `~/.formchat/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Public base address of this server, as seen from host pages.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Directory holding the built loader script and its assets.
    #[serde(default = "default_widget_asset_dir")]
    pub widget_asset_dir: String,

    /// Page size for list queries when the caller does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_widget_asset_dir() -> String {
    "widget/dist".to_string()
}

fn default_page_size() -> u32 {
    10
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            widget_asset_dir: default_widget_asset_dir(),
            default_page_size: default_page_size(),
        }
    }
}
