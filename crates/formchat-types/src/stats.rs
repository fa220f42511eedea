//! Usage counters keyed by chatbot id.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Per-chatbot usage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatbotStats {
    /// Times the conversation frame was loaded.
    pub total_views: i64,
    /// Conversations started.
    pub total_conversations: i64,
    /// Conversations that reached the end of the form.
    pub completed_conversations: i64,
}

impl ChatbotStats {
    /// Completed conversations as a percentage of started ones, rounded to two
    /// decimals. Zero when nothing was started.
    pub fn completion_rate(&self) -> f64 {
        if self.total_conversations <= 0 {
            return 0.0;
        }
        let rate = self.completed_conversations as f64 / self.total_conversations as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }
}

/// A single usage event reported by the conversation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageEvent {
    View,
    ConversationStarted,
    ConversationCompleted,
}

impl fmt::Display for UsageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageEvent::View => write!(f, "view"),
            UsageEvent::ConversationStarted => write!(f, "conversation_started"),
            UsageEvent::ConversationCompleted => write!(f, "conversation_completed"),
        }
    }
}

impl FromStr for UsageEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(UsageEvent::View),
            "conversation_started" => Ok(UsageEvent::ConversationStarted),
            "conversation_completed" => Ok(UsageEvent::ConversationCompleted),
            other => Err(format!("invalid usage event: '{other}'")),
        }
    }
}

/// Fleet-wide aggregate across active chatbots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_chatbots: i64,
    pub active_chatbots: i64,
    pub total_views: i64,
    pub total_conversations: i64,
    pub completed_conversations: i64,
    /// Completed conversations per view, as a percentage.
    pub engagement_rate: f64,
}
