//! Filesystem helpers for FormChat.
//!
//! Resolves the data directory that holds `config.toml` and the database,
//! and the directory the loader script and its assets are served from.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "FORMCHAT_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `FORMCHAT_DATA_DIR` environment variable
/// 2. `~/.formchat` under the user's home directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".formchat");
    }

    // Last resort: current directory
    PathBuf::from(".formchat")
}

/// Create the data directory if it does not exist yet.
pub async fn ensure_data_dir(data_dir: &Path) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(data_dir).await
}

/// Resolve the widget asset directory.
///
/// Absolute paths are used as-is; relative paths are taken relative to the
/// data directory.
pub fn resolve_widget_dir(data_dir: &Path, widget_asset_dir: &str) -> PathBuf {
    let dir = Path::new(widget_asset_dir);
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        data_dir.join(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_ensure_data_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_data_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op.
        ensure_data_dir(&nested).await.unwrap();
    }

    #[test]
    fn test_resolve_widget_dir() {
        let data_dir = PathBuf::from("/home/user/.formchat");
        assert_eq!(
            resolve_widget_dir(&data_dir, "widget/dist"),
            PathBuf::from("/home/user/.formchat/widget/dist")
        );
        assert_eq!(
            resolve_widget_dir(&data_dir, "/srv/widget"),
            PathBuf::from("/srv/widget")
        );
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var(DATA_DIR_ENV, "/tmp/test-formchat");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-formchat"));
        unsafe {
            std::env::remove_var(DATA_DIR_ENV);
        }
    }
}
