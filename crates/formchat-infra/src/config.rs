//! Global configuration loader for FormChat.
//!
//! Reads `config.toml` from the data directory (`~/.formchat/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed, then applies environment overrides.

use std::path::Path;

use formchat_types::config::GlobalConfig;

/// Overrides `api_base_url`.
pub const API_BASE_URL_ENV: &str = "FORMCHAT_API_BASE_URL";

/// Overrides `widget_asset_dir`.
pub const WIDGET_DIR_ENV: &str = "FORMCHAT_WIDGET_DIR";

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Apply overrides looked up by `var` (normally `std::env::var`).
///
/// Blank values are ignored.
pub fn apply_overrides<F>(mut config: GlobalConfig, var: F) -> GlobalConfig
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| var(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = lookup(API_BASE_URL_ENV) {
        config.api_base_url = url;
    }
    if let Some(dir) = lookup(WIDGET_DIR_ENV) {
        config.widget_asset_dir = dir;
    }
    config
}

/// Load `config.toml` and apply environment overrides.
pub async fn resolve_config(data_dir: &Path) -> GlobalConfig {
    let config = load_global_config(data_dir).await;
    apply_overrides(config, |name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.default_page_size, 10);
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(
            &config_path,
            r#"
api_base_url = "https://chat.example.com"
default_page_size = 25
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.api_base_url, "https://chat.example.com");
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.widget_asset_dir, "widget/dist");
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(&config_path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.api_base_url, "http://localhost:3000");
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (API_BASE_URL_ENV, "https://forms.example.org"),
            (WIDGET_DIR_ENV, "   "),
        ]);
        let config = apply_overrides(GlobalConfig::default(), |name| {
            vars.get(name).map(|v| v.to_string())
        });
        assert_eq!(config.api_base_url, "https://forms.example.org");
        assert_eq!(config.widget_asset_dir, "widget/dist");
    }

    #[test]
    fn overrides_absent_keep_config() {
        let config = apply_overrides(GlobalConfig::default(), |_| None);
        assert_eq!(config.api_base_url, "http://localhost:3000");
    }
}
