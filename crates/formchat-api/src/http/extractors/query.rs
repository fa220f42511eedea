//! Query parameter extractors for list endpoints.

use serde::Deserialize;

/// Query parameters for the chatbot list endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatbotListQuery {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size; the configured default applies when absent.
    pub per_page: Option<u32>,
    /// Filter by active flag.
    pub is_active: Option<bool>,
}

fn default_page() -> u32 {
    1
}

impl Default for ChatbotListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: None,
            is_active: None,
        }
    }
}
