//! SQLite chatbot repository implementation.
//!
//! Implements `ChatbotRepository` from `formchat-core` using sqlx with split
//! read/write pools. Usage counters live in `chatbot_usage`, one row per
//! chatbot, created alongside the chatbot and removed with it.

use formchat_core::repository::SortOrder;
use formchat_core::repository::chatbot::{ChatbotFilter, ChatbotRepository};
use formchat_types::chatbot::{Chatbot, ChatbotConfig, Customization, EmbedType};
use formchat_types::error::RepositoryError;
use formchat_types::stats::{ChatbotStats, GlobalStats, UsageEvent};
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::pool::DatabasePool;

const SELECT_CHATBOT: &str = "SELECT c.chatbot_id, c.name, c.google_form_url, c.embed_type, \
     c.customization, c.is_active, c.created_at, c.updated_at, \
     COALESCE(u.total_views, 0) AS total_views, \
     COALESCE(u.total_conversations, 0) AS total_conversations, \
     COALESCE(u.completed_conversations, 0) AS completed_conversations \
     FROM chatbots c LEFT JOIN chatbot_usage u ON u.chatbot_id = c.chatbot_id";

/// SQLite-backed implementation of `ChatbotRepository`.
pub struct SqliteChatbotRepository {
    pool: DatabasePool,
}

impl SqliteChatbotRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Chatbot.
struct ChatbotRow {
    chatbot_id: String,
    name: String,
    google_form_url: String,
    embed_type: String,
    customization: String,
    is_active: bool,
    created_at: String,
    updated_at: String,
    total_views: i64,
    total_conversations: i64,
    completed_conversations: i64,
}

impl ChatbotRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chatbot_id: row.try_get("chatbot_id")?,
            name: row.try_get("name")?,
            google_form_url: row.try_get("google_form_url")?,
            embed_type: row.try_get("embed_type")?,
            customization: row.try_get("customization")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            total_views: row.try_get("total_views")?,
            total_conversations: row.try_get("total_conversations")?,
            completed_conversations: row.try_get("completed_conversations")?,
        })
    }

    fn into_chatbot(self) -> Result<Chatbot, RepositoryError> {
        let embed_type: EmbedType = self
            .embed_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        let customization: Customization = serde_json::from_str(&self.customization)
            .map_err(|e| RepositoryError::Query(format!("invalid customization JSON: {e}")))?;

        Ok(Chatbot {
            config: ChatbotConfig {
                chatbot_id: self.chatbot_id,
                name: self.name,
                google_form_url: self.google_form_url,
                embed_type,
                customization,
                is_active: self.is_active,
            },
            stats: ChatbotStats {
                total_views: self.total_views,
                total_conversations: self.total_conversations,
                completed_conversations: self.completed_conversations,
            },
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

fn stats_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ChatbotStats, RepositoryError> {
    Ok(ChatbotStats {
        total_views: row.try_get("total_views").map_err(query_error)?,
        total_conversations: row.try_get("total_conversations").map_err(query_error)?,
        completed_conversations: row.try_get("completed_conversations").map_err(query_error)?,
    })
}

/// Counter column incremented by a usage event.
fn usage_column(event: UsageEvent) -> &'static str {
    match event {
        UsageEvent::View => "total_views",
        UsageEvent::ConversationStarted => "total_conversations",
        UsageEvent::ConversationCompleted => "completed_conversations",
    }
}

impl ChatbotRepository for SqliteChatbotRepository {
    async fn create(&self, chatbot: &Chatbot) -> Result<Chatbot, RepositoryError> {
        let customization_json = serde_json::to_string(&chatbot.config.customization)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Chatbot row and its counter row are written together.
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query(
            "INSERT INTO chatbots (chatbot_id, name, google_form_url, embed_type, customization, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&chatbot.config.chatbot_id)
        .bind(&chatbot.config.name)
        .bind(&chatbot.config.google_form_url)
        .bind(chatbot.config.embed_type.to_string())
        .bind(&customization_json)
        .bind(chatbot.config.is_active)
        .bind(format_datetime(&chatbot.created_at))
        .bind(format_datetime(&chatbot.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.message().contains("UNIQUE") {
                    return RepositoryError::Conflict(format!(
                        "chatbot '{}' already exists",
                        chatbot.config.chatbot_id
                    ));
                }
            }
            query_error(e)
        })?;

        sqlx::query(
            "INSERT INTO chatbot_usage (chatbot_id, total_views, total_conversations, completed_conversations)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&chatbot.config.chatbot_id)
        .bind(chatbot.stats.total_views)
        .bind(chatbot.stats.total_conversations)
        .bind(chatbot.stats.completed_conversations)
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        Ok(chatbot.clone())
    }

    async fn get(&self, chatbot_id: &str) -> Result<Option<Chatbot>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_CHATBOT} WHERE c.chatbot_id = ?"))
            .bind(chatbot_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let chatbot_row = ChatbotRow::from_row(&row).map_err(query_error)?;
                Ok(Some(chatbot_row.into_chatbot()?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &ChatbotFilter) -> Result<Vec<Chatbot>, RepositoryError> {
        let mut sql = String::from(SELECT_CHATBOT);
        if filter.is_active.is_some() {
            sql.push_str(" WHERE c.is_active = ?");
        }

        let order = match filter.sort_order.unwrap_or_default() {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        sql.push_str(&format!(" ORDER BY c.created_at {order}, c.chatbot_id {order}"));

        // SQLite requires LIMIT before OFFSET; -1 means no limit.
        match (filter.limit, filter.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        let mut query = sqlx::query(&sql);
        if let Some(is_active) = filter.is_active {
            query = query.bind(is_active);
        }

        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut chatbots = Vec::with_capacity(rows.len());
        for row in &rows {
            let chatbot_row = ChatbotRow::from_row(row).map_err(query_error)?;
            chatbots.push(chatbot_row.into_chatbot()?);
        }

        Ok(chatbots)
    }

    async fn count(&self, filter: &ChatbotFilter) -> Result<i64, RepositoryError> {
        let row = match filter.is_active {
            Some(is_active) => {
                sqlx::query("SELECT COUNT(*) AS n FROM chatbots WHERE is_active = ?")
                    .bind(is_active)
                    .fetch_one(&self.pool.reader)
                    .await
            }
            None => {
                sqlx::query("SELECT COUNT(*) AS n FROM chatbots")
                    .fetch_one(&self.pool.reader)
                    .await
            }
        }
        .map_err(query_error)?;

        row.try_get("n").map_err(query_error)
    }

    async fn update(&self, chatbot: &Chatbot) -> Result<Chatbot, RepositoryError> {
        let customization_json = serde_json::to_string(&chatbot.config.customization)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE chatbots SET name = ?, google_form_url = ?, embed_type = ?, customization = ?, is_active = ?, updated_at = ?
             WHERE chatbot_id = ?",
        )
        .bind(&chatbot.config.name)
        .bind(&chatbot.config.google_form_url)
        .bind(chatbot.config.embed_type.to_string())
        .bind(&customization_json)
        .bind(chatbot.config.is_active)
        .bind(format_datetime(&chatbot.updated_at))
        .bind(&chatbot.config.chatbot_id)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(chatbot.clone())
    }

    async fn delete(&self, chatbot_id: &str) -> Result<(), RepositoryError> {
        // chatbot_usage rows go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM chatbots WHERE chatbot_id = ?")
            .bind(chatbot_id)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn record_usage(
        &self,
        chatbot_id: &str,
        event: UsageEvent,
    ) -> Result<ChatbotStats, RepositoryError> {
        let column = usage_column(event);
        let row = sqlx::query(&format!(
            "UPDATE chatbot_usage SET {column} = {column} + 1 WHERE chatbot_id = ?
             RETURNING total_views, total_conversations, completed_conversations"
        ))
        .bind(chatbot_id)
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(query_error)?;

        match row {
            Some(row) => stats_from_row(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn get_stats(&self, chatbot_id: &str) -> Result<Option<ChatbotStats>, RepositoryError> {
        let row = sqlx::query(
            "SELECT COALESCE(u.total_views, 0) AS total_views,
                    COALESCE(u.total_conversations, 0) AS total_conversations,
                    COALESCE(u.completed_conversations, 0) AS completed_conversations
             FROM chatbots c LEFT JOIN chatbot_usage u ON u.chatbot_id = c.chatbot_id
             WHERE c.chatbot_id = ?",
        )
        .bind(chatbot_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        row.as_ref().map(stats_from_row).transpose()
    }

    async fn global_stats(&self) -> Result<GlobalStats, RepositoryError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total_chatbots,
                    COALESCE(SUM(CASE WHEN c.is_active = 1 THEN 1 ELSE 0 END), 0) AS active_chatbots,
                    COALESCE(SUM(CASE WHEN c.is_active = 1 THEN u.total_views ELSE 0 END), 0) AS total_views,
                    COALESCE(SUM(CASE WHEN c.is_active = 1 THEN u.total_conversations ELSE 0 END), 0) AS total_conversations,
                    COALESCE(SUM(CASE WHEN c.is_active = 1 THEN u.completed_conversations ELSE 0 END), 0) AS completed_conversations
             FROM chatbots c LEFT JOIN chatbot_usage u ON u.chatbot_id = c.chatbot_id",
        )
        .fetch_one(&self.pool.reader)
        .await
        .map_err(query_error)?;

        Ok(GlobalStats {
            total_chatbots: row.try_get("total_chatbots").map_err(query_error)?,
            active_chatbots: row.try_get("active_chatbots").map_err(query_error)?,
            total_views: row.try_get("total_views").map_err(query_error)?,
            total_conversations: row.try_get("total_conversations").map_err(query_error)?,
            completed_conversations: row.try_get("completed_conversations").map_err(query_error)?,
            engagement_rate: 0.0,
        })
    }
}
