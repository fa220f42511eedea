//! The conversation frame shell served at `/embed/{id}`.
//!
//! This is the document the widget's session frame points at. It renders the
//! bot's header and the Google Form inline, and counts a view each time it is
//! served.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use formchat_core::embed::customization::resolve_customization;
use formchat_core::embed::escape::escape_attribute;
use formchat_types::chatbot::Chatbot;
use formchat_types::error::ChatbotError;
use formchat_types::stats::UsageEvent;

use crate::state::AppState;

/// GET /embed/{id} - Frame shell for an active chatbot, 404 page otherwise.
pub async fn embed_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.chatbot_service.get(&id).await {
        Ok(chatbot) if chatbot.config.is_active => {
            if let Err(e) = state
                .chatbot_service
                .record_usage(&id, UsageEvent::View)
                .await
            {
                tracing::warn!(chatbot_id = %id, error = %e, "failed to count frame view");
            }
            Html(render_shell(&chatbot)).into_response()
        }
        Ok(_) | Err(ChatbotError::NotFound) => {
            (StatusCode::NOT_FOUND, Html(render_not_found())).into_response()
        }
        Err(e) => {
            tracing::error!(chatbot_id = %id, error = %e, "failed to load chatbot for frame");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_page("Unavailable", "This chatbot is temporarily unavailable.")),
            )
                .into_response()
        }
    }
}

/// Form address switched to Google's embedded rendering.
fn embedded_form_url(url: &str) -> String {
    if url.contains("embedded=true") {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}embedded=true")
}

/// Render the frame shell. All operator text is escaped.
pub fn render_shell(chatbot: &Chatbot) -> String {
    let custom = resolve_customization(&chatbot.config.customization);
    let bot_name = escape_attribute(&custom.bot_name);
    let welcome = escape_attribute(&custom.welcome_message);
    let form_src = escape_attribute(&embedded_form_url(&chatbot.config.google_form_url));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{bot_name}</title>
<style>
html, body {{ margin: 0; height: 100%; font-family: system-ui, sans-serif; }}
body {{ display: flex; flex-direction: column; }}
header {{ padding: 16px; color: #ffffff; background: linear-gradient(135deg, {primary}, {secondary}); }}
header h1 {{ margin: 0; font-size: 16px; }}
header p {{ margin: 4px 0 0; font-size: 13px; opacity: 0.9; }}
iframe {{ flex: 1; width: 100%; border: 0; }}
</style>
</head>
<body>
<header><h1>{bot_name}</h1><p>{welcome}</p></header>
<iframe src="{form_src}" title="{bot_name}" loading="lazy"></iframe>
</body>
</html>
"#,
        primary = custom.primary_color,
        secondary = custom.secondary_color,
    )
}

fn render_not_found() -> String {
    render_page("Chatbot not found", "This chatbot does not exist or is no longer active.")
}

fn render_page(title: &str, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body><p>{message}</p></body>\n</html>\n"
    )
}
