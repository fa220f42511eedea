//! Chatbot management service.
//!
//! Orchestrates chatbot creation, listing, update, deletion and usage
//! counters. Every operation that returns a configuration can also return its
//! compiled embed artifacts; a configuration that does not compile is never
//! persisted.

use formchat_types::chatbot::{
    Chatbot, ChatbotConfig, ChatbotPage, CreateChatbotRequest, UpdateChatbotRequest,
    generate_chatbot_id,
};
use formchat_types::embed::EmbedArtifact;
use formchat_types::error::{ChatbotError, FieldIssue, RepositoryError, ValidationError};
use formchat_types::stats::{ChatbotStats, GlobalStats, UsageEvent};

use crate::embed::EmbedCompiler;
use crate::repository::chatbot::{ChatbotFilter, ChatbotRepository};
use crate::service::hash::Fingerprinter;

/// Largest page size a listing accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Whether `url` points at a Google Form (`docs.google.com/forms/` or the
/// `forms.gle` short link), over https.
pub fn is_google_form_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("https://docs.google.com/forms/") || url.starts_with("https://forms.gle/")
}

/// Completed conversations per view, as a percentage with one decimal.
pub fn engagement_rate(completed: i64, views: i64) -> f64 {
    if views <= 0 {
        return 0.0;
    }
    let rate = completed as f64 / views as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

fn storage_error(e: RepositoryError) -> ChatbotError {
    match e {
        RepositoryError::NotFound => ChatbotError::NotFound,
        RepositoryError::Conflict(msg) => ChatbotError::Conflict(msg),
        other => ChatbotError::StorageError(other.to_string()),
    }
}

/// Service orchestrating the chatbot lifecycle.
///
/// Generic over repository and fingerprinter traits to maintain clean architecture --
/// formchat-core never depends on formchat-infra.
pub struct ChatbotService<R: ChatbotRepository, H: Fingerprinter> {
    repo: R,
    hasher: H,
    compiler: EmbedCompiler,
}

impl<R: ChatbotRepository, H: Fingerprinter> ChatbotService<R, H> {
    pub fn new(repo: R, hasher: H, compiler: EmbedCompiler) -> Self {
        Self {
            repo,
            hasher,
            compiler,
        }
    }

    pub fn compiler(&self) -> &EmbedCompiler {
        &self.compiler
    }

    /// Create a chatbot from a form and return it with its embed artifacts.
    pub async fn create(
        &self,
        request: CreateChatbotRequest,
    ) -> Result<(Chatbot, EmbedArtifact), ChatbotError> {
        let google_form_url = request.google_form_url.trim().to_string();
        if !is_google_form_url(&google_form_url) {
            return Err(ChatbotError::InvalidFormUrl(google_form_url));
        }

        let now = chrono::Utc::now();
        let chatbot = Chatbot {
            config: ChatbotConfig {
                chatbot_id: generate_chatbot_id(),
                name: request.name.trim().to_string(),
                google_form_url,
                embed_type: request.embed_type.unwrap_or_default(),
                customization: request.customization.unwrap_or_default(),
                is_active: true,
            },
            stats: ChatbotStats::default(),
            created_at: now,
            updated_at: now,
        };

        let artifact = self.compiler.compile(&chatbot.config)?;
        let chatbot = self.repo.create(&chatbot).await.map_err(storage_error)?;
        tracing::info!(chatbot_id = %chatbot.chatbot_id(), "chatbot created");
        Ok((chatbot, artifact))
    }

    /// List chatbots one page at a time. `page` is 1-based.
    pub async fn list(
        &self,
        page: u32,
        per_page: u32,
        is_active: Option<bool>,
    ) -> Result<ChatbotPage, ChatbotError> {
        let mut issues = Vec::new();
        if page < 1 {
            issues.push(FieldIssue::invalid("page", "must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&per_page) {
            issues.push(FieldIssue::invalid(
                "per_page",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        if !issues.is_empty() {
            return Err(ValidationError { issues }.into());
        }

        let filter = ChatbotFilter {
            is_active,
            sort_order: None,
            limit: Some(i64::from(per_page)),
            offset: Some(i64::from(page - 1) * i64::from(per_page)),
        };
        let total = self.repo.count(&filter).await.map_err(storage_error)?;
        let chatbots = self.repo.list(&filter).await.map_err(storage_error)?;

        Ok(ChatbotPage {
            chatbots,
            total,
            page,
            per_page,
            total_pages: ChatbotPage::page_count(total, per_page),
        })
    }

    pub async fn get(&self, chatbot_id: &str) -> Result<Chatbot, ChatbotError> {
        self.repo
            .get(chatbot_id)
            .await
            .map_err(storage_error)?
            .ok_or(ChatbotError::NotFound)
    }

    /// Get a chatbot together with freshly compiled artifacts.
    pub async fn get_with_embed(
        &self,
        chatbot_id: &str,
    ) -> Result<(Chatbot, EmbedArtifact), ChatbotError> {
        let chatbot = self.get(chatbot_id).await?;
        let artifact = self.compiler.compile(&chatbot.config)?;
        Ok((chatbot, artifact))
    }

    /// Compile the artifacts of a stored chatbot.
    pub async fn embed(&self, chatbot_id: &str) -> Result<EmbedArtifact, ChatbotError> {
        let chatbot = self.get(chatbot_id).await?;
        Ok(self.compiler.compile(&chatbot.config)?)
    }

    /// Stable fingerprint of an artifact pair, usable as an entity tag.
    pub fn fingerprint(&self, artifact: &EmbedArtifact) -> String {
        self.hasher.fingerprint(artifact)
    }

    /// Apply a partial update and return the result with recompiled artifacts.
    pub async fn update(
        &self,
        chatbot_id: &str,
        request: UpdateChatbotRequest,
    ) -> Result<(Chatbot, EmbedArtifact), ChatbotError> {
        let mut chatbot = self.get(chatbot_id).await?;

        if let Some(url) = request.google_form_url {
            let url = url.trim().to_string();
            if !is_google_form_url(&url) {
                return Err(ChatbotError::InvalidFormUrl(url));
            }
            chatbot.config.google_form_url = url;
        }
        if let Some(name) = request.name {
            chatbot.config.name = name.trim().to_string();
        }
        if let Some(customization) = request.customization {
            chatbot.config.customization = customization;
        }
        if let Some(embed_type) = request.embed_type {
            chatbot.config.embed_type = embed_type;
        }
        if let Some(is_active) = request.is_active {
            chatbot.config.is_active = is_active;
        }
        chatbot.updated_at = chrono::Utc::now();

        let artifact = self.compiler.compile(&chatbot.config)?;
        let chatbot = self.repo.update(&chatbot).await.map_err(storage_error)?;
        Ok((chatbot, artifact))
    }

    /// Delete a chatbot and its usage counters.
    pub async fn delete(&self, chatbot_id: &str) -> Result<(), ChatbotError> {
        self.repo.delete(chatbot_id).await.map_err(storage_error)?;
        tracing::info!(chatbot_id, "chatbot deleted");
        Ok(())
    }

    /// Count one usage event against a chatbot.
    pub async fn record_usage(
        &self,
        chatbot_id: &str,
        event: UsageEvent,
    ) -> Result<ChatbotStats, ChatbotError> {
        self.repo
            .record_usage(chatbot_id, event)
            .await
            .map_err(storage_error)
    }

    pub async fn stats(&self, chatbot_id: &str) -> Result<ChatbotStats, ChatbotError> {
        self.repo
            .get_stats(chatbot_id)
            .await
            .map_err(storage_error)?
            .ok_or(ChatbotError::NotFound)
    }

    /// Counters across all active chatbots with the derived engagement rate.
    pub async fn global_stats(&self) -> Result<GlobalStats, ChatbotError> {
        let mut stats = self.repo.global_stats().await.map_err(storage_error)?;
        stats.engagement_rate = engagement_rate(stats.completed_conversations, stats.total_views);
        Ok(stats)
    }
}
