//! Dashboard statistics endpoint.
//!
//! GET /api/v1/stats - Aggregate counters across active chatbots.

use axum::Json;
use axum::extract::State;

use formchat_types::stats::GlobalStats;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

/// GET /api/v1/stats - Fleet-wide counters and engagement rate.
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<GlobalStats>>, AppError> {
    let clock = RequestClock::start();

    let stats = state.chatbot_service.global_stats().await?;

    let resp = clock
        .success(stats)
        .with_link("self", "/api/v1/stats")
        .with_link("chatbots", "/api/v1/chatbots");
    Ok(Json(resp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formchat_types::chatbot::CreateChatbotRequest;
    use formchat_types::stats::UsageEvent;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stats_empty_fleet() {
        let tmp = TempDir::new().unwrap();
        let state = AppState::init_at(tmp.path()).await.unwrap();

        let Json(resp) = get_stats(State(state)).await.unwrap();
        let stats = resp.data.unwrap();
        assert_eq!(stats.active_chatbots, 0);
        assert_eq!(stats.engagement_rate, 0.0);
        assert_eq!(resp.links["chatbots"], "/api/v1/chatbots");
    }

    #[tokio::test]
    async fn test_stats_engagement_rate() {
        let tmp = TempDir::new().unwrap();
        let state = AppState::init_at(tmp.path()).await.unwrap();
        let (bot, _) = state
            .chatbot_service
            .create(CreateChatbotRequest {
                name: "Feedback".to_string(),
                google_form_url: "https://forms.gle/abc123".to_string(),
                customization: None,
                embed_type: None,
            })
            .await
            .unwrap();
        for event in [
            UsageEvent::View,
            UsageEvent::View,
            UsageEvent::View,
            UsageEvent::View,
            UsageEvent::ConversationStarted,
            UsageEvent::ConversationCompleted,
        ] {
            state
                .chatbot_service
                .record_usage(bot.chatbot_id(), event)
                .await
                .unwrap();
        }

        let Json(resp) = get_stats(State(state)).await.unwrap();
        let stats = resp.data.unwrap();
        assert_eq!(stats.active_chatbots, 1);
        assert_eq!(stats.total_views, 4);
        assert!((stats.engagement_rate - 25.0).abs() < f64::EPSILON);
    }
}
