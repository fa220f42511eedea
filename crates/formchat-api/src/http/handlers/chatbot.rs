//! Chatbot CRUD, embed and usage handlers for the REST API.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use formchat_observe::attrs::{SPAN_EMBED_COMPILE, SPAN_USAGE_RECORD};
use formchat_types::chatbot::{Chatbot, ChatbotPage, CreateChatbotRequest, UpdateChatbotRequest};
use formchat_types::embed::EmbedArtifact;
use formchat_types::stats::{ChatbotStats, UsageEvent};

use crate::http::error::AppError;
use crate::http::extractors::query::ChatbotListQuery;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

/// A chatbot together with its compiled embed code.
#[derive(Debug, Serialize)]
pub struct ChatbotWithEmbed {
    pub chatbot: Chatbot,
    pub embed_code: EmbedArtifact,
}

/// Per-chatbot counters plus the derived completion rate.
#[derive(Debug, Serialize)]
pub struct ChatbotStatsView {
    pub chatbot_id: String,
    #[serde(flatten)]
    pub stats: ChatbotStats,
    pub completion_rate: f64,
}

impl ChatbotStatsView {
    fn new(chatbot_id: String, stats: ChatbotStats) -> Self {
        let completion_rate = stats.completion_rate();
        Self {
            chatbot_id,
            stats,
            completion_rate,
        }
    }
}

/// Body of a usage report.
#[derive(Debug, Deserialize)]
pub struct UsageRequest {
    pub event: UsageEvent,
}

fn chatbot_links<T: Serialize>(resp: ApiResponse<T>, id: &str) -> ApiResponse<T> {
    resp.with_link("self", &format!("/api/v1/chatbots/{id}"))
        .with_link("embed", &format!("/api/v1/chatbots/{id}/embed"))
        .with_link("stats", &format!("/api/v1/chatbots/{id}/stats"))
        .with_link("frame", &format!("/embed/{id}"))
}

/// POST /api/v1/chatbots - Create a chatbot and return its embed code.
pub async fn create_chatbot(
    State(state): State<AppState>,
    Json(body): Json<CreateChatbotRequest>,
) -> Result<Json<ApiResponse<ChatbotWithEmbed>>, AppError> {
    let clock = RequestClock::start();

    let (chatbot, embed_code) = state
        .chatbot_service
        .create(body)
        .instrument(tracing::info_span!(SPAN_EMBED_COMPILE))
        .await?;

    let id = chatbot.chatbot_id().to_string();
    let resp = clock.success(ChatbotWithEmbed {
        chatbot,
        embed_code,
    });
    Ok(Json(chatbot_links(resp, &id)))
}

/// GET /api/v1/chatbots - Paginated chatbot listing.
pub async fn list_chatbots(
    State(state): State<AppState>,
    Query(query): Query<ChatbotListQuery>,
) -> Result<Json<ApiResponse<ChatbotPage>>, AppError> {
    let clock = RequestClock::start();
    let per_page = query.per_page.unwrap_or(state.config.default_page_size);

    let page = state
        .chatbot_service
        .list(query.page, per_page, query.is_active)
        .await?;

    let resp = clock.success(page).with_link("self", "/api/v1/chatbots");
    Ok(Json(resp))
}

/// GET /api/v1/chatbots/{id} - A chatbot with its embed code.
///
/// The `ETag` is the fingerprint of the artifact pair; a matching
/// `If-None-Match` short-circuits with 304.
pub async fn get_chatbot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let clock = RequestClock::start();

    let (chatbot, embed_code) = state
        .chatbot_service
        .get_with_embed(&id)
        .instrument(tracing::info_span!(SPAN_EMBED_COMPILE, chatbot_id = %id))
        .await?;
    let etag = format!("\"{}\"", state.chatbot_service.fingerprint(&embed_code));

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag);
    if not_modified {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    let resp = clock.success(ChatbotWithEmbed {
        chatbot,
        embed_code,
    });
    let resp = chatbot_links(resp, &id);
    Ok(([(header::ETAG, etag)], Json(resp)).into_response())
}

/// PUT /api/v1/chatbots/{id} - Partial update.
pub async fn update_chatbot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateChatbotRequest>,
) -> Result<Json<ApiResponse<ChatbotWithEmbed>>, AppError> {
    let clock = RequestClock::start();

    let (chatbot, embed_code) = state.chatbot_service.update(&id, body).await?;

    let resp = clock.success(ChatbotWithEmbed {
        chatbot,
        embed_code,
    });
    Ok(Json(chatbot_links(resp, &id)))
}

/// DELETE /api/v1/chatbots/{id} - Delete a chatbot and its counters.
pub async fn delete_chatbot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let clock = RequestClock::start();

    state.chatbot_service.delete(&id).await?;

    let resp = clock.success(serde_json::json!({"deleted": true, "chatbot_id": id}));
    Ok(Json(resp))
}

/// GET /api/v1/chatbots/{id}/embed - The artifact pair only.
pub async fn get_embed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmbedArtifact>>, AppError> {
    let clock = RequestClock::start();

    let artifact = state
        .chatbot_service
        .embed(&id)
        .instrument(tracing::info_span!(SPAN_EMBED_COMPILE, chatbot_id = %id))
        .await?;

    let resp = clock
        .success(artifact)
        .with_link("chatbot", &format!("/api/v1/chatbots/{id}"));
    Ok(Json(resp))
}

/// GET /api/v1/chatbots/{id}/stats - Usage counters for one chatbot.
pub async fn get_chatbot_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ChatbotStatsView>>, AppError> {
    let clock = RequestClock::start();

    let stats = state.chatbot_service.stats(&id).await?;

    let resp = clock
        .success(ChatbotStatsView::new(id.clone(), stats))
        .with_link("chatbot", &format!("/api/v1/chatbots/{id}"));
    Ok(Json(resp))
}

/// POST /api/v1/chatbots/{id}/usage - Count one usage event.
pub async fn record_usage(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UsageRequest>,
) -> Result<Json<ApiResponse<ChatbotStatsView>>, AppError> {
    let clock = RequestClock::start();

    let stats = state
        .chatbot_service
        .record_usage(&id, body.event)
        .instrument(tracing::info_span!(SPAN_USAGE_RECORD, chatbot_id = %id, event = %body.event))
        .await?;

    Ok(Json(clock.success(ChatbotStatsView::new(id, stats))))
}
