//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};

use formchat_types::error::ChatbotError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chatbot-related errors.
    Chatbot(ChatbotError),
}

impl From<ChatbotError> for AppError {
    fn from(e: ChatbotError) -> Self {
        AppError::Chatbot(e)
    }
}

impl AppError {
    /// Machine-readable code, message and optional structured details.
    fn parts(&self) -> (&'static str, String, Option<serde_json::Value>) {
        match self {
            AppError::Chatbot(ChatbotError::NotFound) => {
                ("CHATBOT_NOT_FOUND", "Chatbot not found".to_string(), None)
            }
            AppError::Chatbot(ChatbotError::InvalidFormUrl(url)) => (
                "INVALID_FORM_URL",
                format!("Invalid Google Form URL: '{url}'"),
                None,
            ),
            AppError::Chatbot(ChatbotError::Validation(err)) => {
                let fields = serde_json::json!({ "fields": err.fields() });
                ("VALIDATION_ERROR", err.to_string(), Some(fields))
            }
            AppError::Chatbot(ChatbotError::Conflict(id)) => {
                ("CONFLICT", format!("Chatbot '{id}' already exists"), None)
            }
            AppError::Chatbot(e @ ChatbotError::StorageError(_)) => {
                ("STORAGE_ERROR", e.to_string(), None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message, details) = self.parts();
        if code == "STORAGE_ERROR" {
            tracing::error!(error = %message, "request failed");
        }

        let request_id = uuid::Uuid::now_v7().to_string();
        ApiResponse::error(code, &message, details, request_id, 0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use formchat_types::error::{FieldIssue, ValidationError};

    #[test]
    fn test_not_found_maps_to_404() {
        let resp = AppError::from(ChatbotError::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_form_url_maps_to_400() {
        let err = AppError::from(ChatbotError::InvalidFormUrl("https://example.com".into()));
        assert_eq!(err.parts().0, "INVALID_FORM_URL");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_lists_fields() {
        let err = AppError::from(ChatbotError::Validation(ValidationError {
            issues: vec![FieldIssue::missing("google_form_url")],
        }));
        let (code, _, details) = err.parts();
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(details.unwrap()["fields"][0], "google_form_url");
    }

    #[test]
    fn test_conflict_and_storage() {
        let conflict = AppError::from(ChatbotError::Conflict("bot_1".into())).into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        let storage = AppError::from(ChatbotError::StorageError("disk".into())).into_response();
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
