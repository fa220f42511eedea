//! Axum router configuration with middleware.
//!
//! REST routes are under `/api/v1/`; the conversation frame shell lives at
//! `/embed/{id}`. Middleware: CORS, tracing.
//!
//! The loader script (`/chatbot-widget.js`) is always served: from the widget
//! directory when it holds a copy, otherwise the one built into the binary.
//! Other assets are served from the configured widget directory. API routes
//! take priority; unknown paths fall through to the directory when it exists.

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use formchat_core::embed::compiler::LOADER_SCRIPT_PATH;
use formchat_observe::attrs::{SPAN_HTTP_REQUEST, TARGET_HTTP};

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Host pages on any origin call the API from the widget and frame.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            target: TARGET_HTTP,
            SPAN_HTTP_REQUEST,
            method = %request.method(),
            uri = %request.uri()
        )
    });

    let api_routes = Router::new()
        // Chatbot CRUD
        .route(
            "/chatbots",
            post(handlers::chatbot::create_chatbot).get(handlers::chatbot::list_chatbots),
        )
        .route(
            "/chatbots/{id}",
            get(handlers::chatbot::get_chatbot)
                .put(handlers::chatbot::update_chatbot)
                .delete(handlers::chatbot::delete_chatbot),
        )
        .route("/chatbots/{id}/embed", get(handlers::chatbot::get_embed))
        // Usage
        .route(
            "/chatbots/{id}/stats",
            get(handlers::chatbot::get_chatbot_stats),
        )
        .route("/chatbots/{id}/usage", post(handlers::chatbot::record_usage))
        // Dashboard stats
        .route("/stats", get(handlers::stats::get_stats));

    let widget_dir = state.widget_dir.clone();

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/embed/{id}", get(handlers::embed::embed_page))
        .route(LOADER_SCRIPT_PATH, get(handlers::widget::loader_script))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(trace)
        .with_state(state);

    if widget_dir.exists() {
        router = router.fallback_service(ServeDir::new(&widget_dir));
        tracing::info!(path = %widget_dir.display(), "widget asset serving enabled");
    } else {
        tracing::debug!(
            path = %widget_dir.display(),
            "widget asset directory not found, serving built-in loader only"
        );
    }

    router
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_version() {
        let axum::Json(body) = health_check().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_router_builds_with_and_without_widget_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let state = AppState::init_at(tmp.path()).await.unwrap();
        let _ = build_router(state.clone());

        tokio::fs::create_dir_all(&state.widget_dir).await.unwrap();
        let _ = build_router(state);
    }
}
