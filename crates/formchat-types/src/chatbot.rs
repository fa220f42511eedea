use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::stats::ChatbotStats;

/// Default primary (button/header) color.
pub const DEFAULT_PRIMARY_COLOR: &str = "#7c3aed";
/// Default secondary (accent) color.
pub const DEFAULT_SECONDARY_COLOR: &str = "#2563eb";
/// Default display name of the bot inside the widget chrome.
pub const DEFAULT_BOT_NAME: &str = "Assistant";
/// Default greeting shown in the panel header.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hi! How can I help you today?";

/// Maximum length of a chatbot identifier.
pub const MAX_CHATBOT_ID_LEN: usize = 64;

/// Generate a fresh chatbot identifier: `bot_` followed by 12 lowercase hex chars.
///
/// The hex tail is taken from the random section of a UUID v7, so ids minted
/// within the same millisecond still differ.
pub fn generate_chatbot_id() -> String {
    let simple = Uuid::now_v7().simple().to_string();
    format!("bot_{}", &simple[simple.len() - 12..])
}

/// Whether `id` belongs to the identifier alphabet `[A-Za-z0-9_-]{1,64}`.
///
/// Every externally visible id a widget creates is derived from the chatbot id,
/// so anything outside this alphabet is rejected rather than escaped.
///
/// ```
/// use formchat_types::chatbot::is_valid_chatbot_id;
///
/// assert!(is_valid_chatbot_id("bot_1a2b3c4d5e6f"));
/// assert!(!is_valid_chatbot_id("bot\"><script>"));
/// assert!(!is_valid_chatbot_id(""));
/// ```
pub fn is_valid_chatbot_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_CHATBOT_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// How the operator intends to embed the chatbot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedType {
    Popup,
    Iframe,
}

impl fmt::Display for EmbedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedType::Popup => write!(f, "popup"),
            EmbedType::Iframe => write!(f, "iframe"),
        }
    }
}

impl FromStr for EmbedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "popup" => Ok(EmbedType::Popup),
            "iframe" => Ok(EmbedType::Iframe),
            other => Err(format!("invalid embed type: '{other}'")),
        }
    }
}

impl Default for EmbedType {
    fn default() -> Self {
        EmbedType::Popup
    }
}

/// Screen corner the floating chrome is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    BottomLeft,
    BottomRight,
}

impl Position {
    /// Resolve an operator-supplied position. Anything other than the two
    /// accepted values falls back to bottom-right.
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    /// Name of the CSS edge property the chrome is anchored to.
    pub fn edge(&self) -> &'static str {
        match self {
            Position::BottomLeft => "left",
            Position::BottomRight => "right",
        }
    }

    /// The edge that is explicitly released (`auto`) when anchoring.
    pub fn opposite_edge(&self) -> &'static str {
        match self {
            Position::BottomLeft => "right",
            Position::BottomRight => "left",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::BottomLeft => write!(f, "bottom-left"),
            Position::BottomRight => write!(f, "bottom-right"),
        }
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bottom-left" => Ok(Position::BottomLeft),
            "bottom-right" => Ok(Position::BottomRight),
            other => Err(format!("invalid position: '{other}'")),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::BottomRight
    }
}

/// Widget size preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSize {
    Small,
    Medium,
    Large,
}

impl WidgetSize {
    /// Resolve an operator-supplied size, defaulting to medium.
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    /// Popup panel dimensions in pixels as `(width, height)`.
    pub fn panel_dimensions(&self) -> (u32, u32) {
        match self {
            WidgetSize::Small => (300, 420),
            WidgetSize::Medium => (350, 500),
            WidgetSize::Large => (420, 600),
        }
    }

    /// Height in pixels of the inline iframe artifact.
    pub fn iframe_height(&self) -> u32 {
        match self {
            WidgetSize::Small => 400,
            WidgetSize::Medium => 600,
            WidgetSize::Large => 800,
        }
    }
}

impl fmt::Display for WidgetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetSize::Small => write!(f, "small"),
            WidgetSize::Medium => write!(f, "medium"),
            WidgetSize::Large => write!(f, "large"),
        }
    }
}

impl FromStr for WidgetSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(WidgetSize::Small),
            "medium" => Ok(WidgetSize::Medium),
            "large" => Ok(WidgetSize::Large),
            other => Err(format!("invalid widget size: '{other}'")),
        }
    }
}

impl Default for WidgetSize {
    fn default() -> Self {
        WidgetSize::Medium
    }
}

/// Operator-supplied cosmetic settings, stored as entered.
///
/// Values are raw strings: an unsupported position or an invalid color is not
/// an error here. Resolution to effective values happens when the widget is
/// compiled or bootstrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customization {
    pub primary_color: String,
    pub secondary_color: String,
    pub bot_name: String,
    pub welcome_message: String,
    /// `bottom-left` or `bottom-right`.
    pub position: String,
    /// `small`, `medium` or `large`.
    pub size: String,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            bot_name: DEFAULT_BOT_NAME.to_string(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            position: Position::default().to_string(),
            size: WidgetSize::default().to_string(),
        }
    }
}

/// The configuration a chatbot's embed artifacts are compiled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatbotConfig {
    /// Opaque unique identifier; namespaces every id the widget creates.
    pub chatbot_id: String,
    pub name: String,
    pub google_form_url: String,
    #[serde(default)]
    pub embed_type: EmbedType,
    #[serde(default)]
    pub customization: Customization,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// A persisted chatbot: its configuration plus bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chatbot {
    #[serde(flatten)]
    pub config: ChatbotConfig,
    /// Usage counters.
    #[serde(default)]
    pub stats: ChatbotStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chatbot {
    pub fn chatbot_id(&self) -> &str {
        &self.config.chatbot_id
    }
}

/// Request to create a new chatbot from a form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatbotRequest {
    pub name: String,
    pub google_form_url: String,
    pub customization: Option<Customization>,
    pub embed_type: Option<EmbedType>,
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChatbotRequest {
    pub name: Option<String>,
    pub google_form_url: Option<String>,
    pub customization: Option<Customization>,
    pub embed_type: Option<EmbedType>,
    pub is_active: Option<bool>,
}

/// One page of a chatbot listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotPage {
    pub chatbots: Vec<Chatbot>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl ChatbotPage {
    /// Number of pages needed for `total` items at `per_page` each.
    pub fn page_count(total: i64, per_page: u32) -> u32 {
        if per_page == 0 || total <= 0 {
            return 0;
        }
        let per_page = i64::from(per_page);
        u32::try_from((total + per_page - 1) / per_page).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(ChatbotPage::page_count(0, 10), 0);
        assert_eq!(ChatbotPage::page_count(10, 10), 1);
        assert_eq!(ChatbotPage::page_count(11, 10), 2);
        assert_eq!(ChatbotPage::page_count(5, 100), 1);
    }

    #[test]
    fn test_generate_chatbot_id_shape() {
        let id = generate_chatbot_id();
        assert!(id.starts_with("bot_"));
        assert_eq!(id.len(), 16);
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(is_valid_chatbot_id(&id));
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(generate_chatbot_id(), generate_chatbot_id());
    }

    #[test]
    fn test_chatbot_id_alphabet() {
        assert!(is_valid_chatbot_id("abc-DEF_123"));
        assert!(!is_valid_chatbot_id("has space"));
        assert!(!is_valid_chatbot_id("quote'"));
        assert!(!is_valid_chatbot_id(&"a".repeat(MAX_CHATBOT_ID_LEN + 1)));
    }

    #[test]
    fn test_position_resolve_falls_back_to_bottom_right() {
        assert_eq!(Position::resolve(Some("bottom-left")), Position::BottomLeft);
        assert_eq!(Position::resolve(Some("top-left")), Position::BottomRight);
        assert_eq!(Position::resolve(Some("")), Position::BottomRight);
        assert_eq!(Position::resolve(None), Position::BottomRight);
    }

    #[test]
    fn test_position_edges() {
        assert_eq!(Position::BottomLeft.edge(), "left");
        assert_eq!(Position::BottomLeft.opposite_edge(), "right");
        assert_eq!(Position::BottomRight.edge(), "right");
    }

    #[test]
    fn test_widget_size_resolve() {
        assert_eq!(WidgetSize::resolve(Some("LARGE")), WidgetSize::Large);
        assert_eq!(WidgetSize::resolve(Some("huge")), WidgetSize::Medium);
        assert_eq!(WidgetSize::Small.panel_dimensions(), (300, 420));
        assert_eq!(WidgetSize::Medium.iframe_height(), 600);
    }

    #[test]
    fn test_customization_defaults() {
        let c = Customization::default();
        assert_eq!(c.primary_color, "#7c3aed");
        assert_eq!(c.secondary_color, "#2563eb");
        assert_eq!(c.position, "bottom-right");
        assert_eq!(c.size, "medium");
    }

    #[test]
    fn test_chatbot_config_deserialize_fills_defaults() {
        let json = r#"{"chatbot_id":"bot_x","name":"Contact","google_form_url":"https://forms.gle/abc"}"#;
        let config: ChatbotConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.embed_type, EmbedType::Popup);
        assert!(config.is_active);
        assert_eq!(config.customization, Customization::default());
    }

    #[test]
    fn test_partial_customization_keeps_other_defaults() {
        let json = r#"{"position":"bottom-left"}"#;
        let c: Customization = serde_json::from_str(json).unwrap();
        assert_eq!(c.position, "bottom-left");
        assert_eq!(c.bot_name, DEFAULT_BOT_NAME);
    }

    #[test]
    fn test_chatbot_serializes_flat() {
        let now = Utc::now();
        let bot = Chatbot {
            config: ChatbotConfig {
                chatbot_id: "bot_1".to_string(),
                name: "Survey".to_string(),
                google_form_url: "https://forms.gle/x".to_string(),
                embed_type: EmbedType::Iframe,
                customization: Customization::default(),
                is_active: false,
            },
            stats: ChatbotStats::default(),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&bot).unwrap();
        assert_eq!(value["chatbot_id"], "bot_1");
        assert_eq!(value["embed_type"], "iframe");
        assert_eq!(value["is_active"], false);
    }
}
