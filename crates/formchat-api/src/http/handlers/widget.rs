//! The widget loader script served at `/chatbot-widget.js`.
//!
//! A copy of the loader ships inside the binary, so the popup snippet works
//! against a fresh install. A `chatbot-widget.js` placed in the widget asset
//! directory takes precedence over the built-in copy.

use std::borrow::Cow;
use std::io::ErrorKind;

use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use formchat_core::embed::compiler::LOADER_SCRIPT_PATH;

use crate::state::AppState;

/// Loader bundled at build time.
pub const BUILTIN_LOADER: &str = include_str!("../../../assets/chatbot-widget.js");

/// GET /chatbot-widget.js
pub async fn loader_script(State(state): State<AppState>) -> Response {
    let file_name = LOADER_SCRIPT_PATH.trim_start_matches('/');
    let path = state.widget_dir.join(file_name);

    let body: Cow<'static, str> = match tokio::fs::read_to_string(&path).await {
        Ok(script) => {
            tracing::debug!(path = %path.display(), "serving loader from widget directory");
            Cow::Owned(script)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Cow::Borrowed(BUILTIN_LOADER),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable loader override, using built-in");
            Cow::Borrowed(BUILTIN_LOADER)
        }
    };

    (
        [
            (CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=300"),
        ],
        body,
    )
        .into_response()
}
