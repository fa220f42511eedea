//! Resolution of operator-supplied customization into effective values.
//!
//! Cosmetic inputs fail open: a blank or malformed color, an unknown position
//! or size silently resolves to the built-in default. The same resolution runs
//! at compile time (server) and at bootstrap time (host page), so a hand-edited
//! snippet still renders with sane styling.

use formchat_types::chatbot::{
    Customization, DEFAULT_BOT_NAME, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR,
    DEFAULT_WELCOME_MESSAGE, Position, WidgetSize,
};
use formchat_types::embed::{EffectiveCustomization, WidgetConfig};

use super::escape::is_valid_color;

/// Resolve a color, falling back to `default` when empty or malformed.
pub fn resolve_color(raw: Option<&str>, default: &str) -> String {
    match raw.map(str::trim) {
        Some(value) if is_valid_color(value) => value.to_string(),
        _ => default.to_string(),
    }
}

/// Resolve free text, falling back to `default` when blank.
fn resolve_text(raw: Option<&str>, default: &str) -> String {
    match raw {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

/// Merge a bootstrap config over the built-in defaults, field by field.
pub fn merge_widget_config(config: Option<&WidgetConfig>) -> EffectiveCustomization {
    let empty = WidgetConfig::default();
    let config = config.unwrap_or(&empty);

    EffectiveCustomization {
        primary_color: resolve_color(config.primary_color.as_deref(), DEFAULT_PRIMARY_COLOR),
        secondary_color: resolve_color(config.secondary_color.as_deref(), DEFAULT_SECONDARY_COLOR),
        bot_name: resolve_text(config.bot_name.as_deref(), DEFAULT_BOT_NAME),
        welcome_message: resolve_text(config.welcome_message.as_deref(), DEFAULT_WELCOME_MESSAGE),
        position: Position::resolve(config.position.as_deref()),
        size: WidgetSize::resolve(config.size.as_deref()),
    }
}

/// Resolve a stored customization record.
pub fn resolve_customization(customization: &Customization) -> EffectiveCustomization {
    EffectiveCustomization {
        primary_color: resolve_color(Some(&customization.primary_color), DEFAULT_PRIMARY_COLOR),
        secondary_color: resolve_color(
            Some(&customization.secondary_color),
            DEFAULT_SECONDARY_COLOR,
        ),
        bot_name: resolve_text(Some(&customization.bot_name), DEFAULT_BOT_NAME),
        welcome_message: resolve_text(
            Some(&customization.welcome_message),
            DEFAULT_WELCOME_MESSAGE,
        ),
        position: Position::resolve(Some(&customization.position)),
        size: WidgetSize::resolve(Some(&customization.size)),
    }
}
