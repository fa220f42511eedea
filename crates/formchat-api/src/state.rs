//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! The chatbot service is generic over repository/fingerprinter traits, but AppState
//! pins it to the concrete infra implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use formchat_core::embed::EmbedCompiler;
use formchat_core::service::chatbot::ChatbotService;
use formchat_infra::config::resolve_config;
use formchat_infra::crypto::hash::Sha256Fingerprinter;
use formchat_infra::filesystem::{ensure_data_dir, resolve_data_dir, resolve_widget_dir};
use formchat_infra::sqlite::chatbot::SqliteChatbotRepository;
use formchat_infra::sqlite::pool::{DatabasePool, database_url};
use formchat_types::config::GlobalConfig;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteChatbotService = ChatbotService<SqliteChatbotRepository, Sha256Fingerprinter>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chatbot_service: Arc<ConcreteChatbotService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    /// Where the loader script and its assets are served from.
    pub widget_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state from the resolved data directory.
    pub async fn init() -> anyhow::Result<Self> {
        Self::init_at(&resolve_data_dir()).await
    }

    /// Initialize against an explicit data directory: load config, connect
    /// to the database and wire services.
    pub async fn init_at(data_dir: &Path) -> anyhow::Result<Self> {
        ensure_data_dir(data_dir).await?;

        let config = resolve_config(data_dir).await;
        let db_pool = DatabasePool::new(&database_url(data_dir)).await?;

        let chatbot_service = ChatbotService::new(
            SqliteChatbotRepository::new(db_pool),
            Sha256Fingerprinter,
            EmbedCompiler::new(config.api_base_url.clone()),
        );

        let widget_dir = resolve_widget_dir(data_dir, &config.widget_asset_dir);
        tracing::debug!(
            data_dir = %data_dir.display(),
            api_base_url = %config.api_base_url,
            "application state initialized"
        );

        Ok(Self {
            chatbot_service: Arc::new(chatbot_service),
            config: Arc::new(config),
            data_dir: data_dir.to_path_buf(),
            widget_dir,
        })
    }
}
