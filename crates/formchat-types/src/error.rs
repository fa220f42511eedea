use std::fmt;

use thiserror::Error;

/// One missing or invalid field found during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

impl FieldIssue {
    pub fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            reason: "is required".to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Structured validation failure naming every offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", format_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Names of the offending fields, in the order they were checked.
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }

    pub fn names(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors related to chatbot operations.
#[derive(Debug, Error)]
pub enum ChatbotError {
    #[error("chatbot not found")]
    NotFound,

    #[error("invalid Google Form URL: '{0}'")]
    InvalidFormUrl(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("chatbot '{0}' already exists")]
    Conflict(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Reasons the widget loader refuses a bootstrap call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("bootstrap options missing chatbotId")]
    MissingChatbotId,

    #[error("chatbotId '{0}' is outside the identifier alphabet")]
    InvalidChatbotId(String),

    #[error("bootstrap options missing apiBaseUrl")]
    MissingApiBaseUrl,

    #[error("apiBaseUrl '{0}' is not an http(s) address")]
    InvalidApiBaseUrl(String),

    #[error("malformed bootstrap options: {0}")]
    MalformedOptions(String),
}

/// Errors from repository operations (used by trait definitions in formchat-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
