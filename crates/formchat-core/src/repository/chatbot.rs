//! Chatbot repository trait definition.

use formchat_types::chatbot::Chatbot;
use formchat_types::error::RepositoryError;
use formchat_types::stats::{ChatbotStats, GlobalStats, UsageEvent};

use super::SortOrder;

/// Filter criteria for listing chatbots.
#[derive(Debug, Clone, Default)]
pub struct ChatbotFilter {
    /// Only active (or only inactive) chatbots.
    pub is_active: Option<bool>,
    /// Direction of the `created_at` ordering.
    pub sort_order: Option<SortOrder>,
    /// Maximum number of results.
    pub limit: Option<i64>,
    /// Number of results to skip (offset pagination).
    pub offset: Option<i64>,
}

/// Repository trait for chatbot records and their usage counters.
///
/// Implementations live in formchat-infra (e.g., SqliteChatbotRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ChatbotRepository: Send + Sync {
    /// Persist a new chatbot. Fails with `Conflict` if the id is taken.
    fn create(
        &self,
        chatbot: &Chatbot,
    ) -> impl std::future::Future<Output = Result<Chatbot, RepositoryError>> + Send;

    /// Get a chatbot (with its counters) by id.
    fn get(
        &self,
        chatbot_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Chatbot>, RepositoryError>> + Send;

    /// List chatbots, newest first unless the filter says otherwise.
    fn list(
        &self,
        filter: &ChatbotFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Chatbot>, RepositoryError>> + Send;

    /// Count chatbots matching the filter, ignoring limit and offset.
    fn count(
        &self,
        filter: &ChatbotFilter,
    ) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;

    /// Overwrite the stored configuration. Counters are left untouched.
    fn update(
        &self,
        chatbot: &Chatbot,
    ) -> impl std::future::Future<Output = Result<Chatbot, RepositoryError>> + Send;

    /// Delete a chatbot and its counters. Fails with `NotFound` if absent.
    fn delete(
        &self,
        chatbot_id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Increment the counter for one usage event.
    fn record_usage(
        &self,
        chatbot_id: &str,
        event: UsageEvent,
    ) -> impl std::future::Future<Output = Result<ChatbotStats, RepositoryError>> + Send;

    /// Usage counters for one chatbot.
    fn get_stats(
        &self,
        chatbot_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatbotStats>, RepositoryError>> + Send;

    /// Counters summed over every chatbot.
    fn global_stats(
        &self,
    ) -> impl std::future::Future<Output = Result<GlobalStats, RepositoryError>> + Send;
}
