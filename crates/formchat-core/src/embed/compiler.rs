//! Config compiler: `ChatbotConfig` -> `EmbedArtifact`.
//!
//! Compilation is a pure function of the configuration and the resolved API
//! base address. No I/O, no clock, no randomness: compiling an unchanged
//! chatbot twice yields byte-identical snippets, so re-viewing embed code is
//! idempotent.

use formchat_types::chatbot::{ChatbotConfig, is_valid_chatbot_id};
use formchat_types::embed::{BootstrapOptions, EffectiveCustomization, EmbedArtifact};
use formchat_types::error::{FieldIssue, ValidationError};

use super::customization::resolve_customization;
use super::escape::{escape_attribute, escape_script_json, normalize_api_base_url};

/// Path of the loader script relative to the API base address.
pub const LOADER_SCRIPT_PATH: &str = "/chatbot-widget.js";

/// Global object the loader script installs on the host page.
pub const LOADER_GLOBAL: &str = "FormChat";

/// Address of the conversation frame for one chatbot.
pub fn frame_url(api_base_url: &str, chatbot_id: &str) -> String {
    format!("{api_base_url}/embed/{chatbot_id}")
}

/// Compiles chatbot configurations against one API base address.
#[derive(Debug, Clone)]
pub struct EmbedCompiler {
    api_base_url: String,
}

/// Inputs that passed validation, ready for rendering.
struct ValidatedInput<'a> {
    chatbot_id: &'a str,
    api_base_url: String,
    customization: EffectiveCustomization,
}

impl EmbedCompiler {
    /// Create a compiler for artifacts pointing at `api_base_url`.
    ///
    /// The address is validated on every compile so that a bad address is
    /// reported alongside any bad config fields.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Compile both artifacts. Fails with every offending field named; never
    /// produces a partial artifact.
    pub fn compile(&self, config: &ChatbotConfig) -> Result<EmbedArtifact, ValidationError> {
        let input = self.validate(config)?;
        Ok(EmbedArtifact {
            popup: render_popup(&input),
            iframe: render_iframe(&input),
        })
    }

    /// Compile only the popup snippet.
    pub fn compile_popup(&self, config: &ChatbotConfig) -> Result<String, ValidationError> {
        Ok(render_popup(&self.validate(config)?))
    }

    /// Compile only the iframe snippet.
    pub fn compile_iframe(&self, config: &ChatbotConfig) -> Result<String, ValidationError> {
        Ok(render_iframe(&self.validate(config)?))
    }

    fn validate<'a>(&self, config: &'a ChatbotConfig) -> Result<ValidatedInput<'a>, ValidationError> {
        let mut issues = Vec::new();

        let chatbot_id = config.chatbot_id.trim();
        if chatbot_id.is_empty() {
            issues.push(FieldIssue::missing("chatbot_id"));
        } else if !is_valid_chatbot_id(chatbot_id) {
            issues.push(FieldIssue::invalid(
                "chatbot_id",
                "must contain only letters, digits, '_' or '-' (max 64)",
            ));
        }

        if config.name.trim().is_empty() {
            issues.push(FieldIssue::missing("name"));
        }

        if config.google_form_url.trim().is_empty() {
            issues.push(FieldIssue::missing("google_form_url"));
        }

        let api_base_url = match normalize_api_base_url(&self.api_base_url) {
            Ok(url) => Some(url),
            Err(reason) => {
                issues.push(FieldIssue::invalid("api_base_url", reason));
                None
            }
        };

        match api_base_url {
            Some(api_base_url) if issues.is_empty() => Ok(ValidatedInput {
                chatbot_id,
                api_base_url,
                customization: resolve_customization(&config.customization),
            }),
            _ => Err(ValidationError { issues }),
        }
    }
}

/// Compile with a one-off compiler.
pub fn compile(config: &ChatbotConfig, api_base_url: &str) -> Result<EmbedArtifact, ValidationError> {
    EmbedCompiler::new(api_base_url).compile(config)
}

fn render_popup(input: &ValidatedInput<'_>) -> String {
    let options = BootstrapOptions {
        chatbot_id: Some(input.chatbot_id.to_string()),
        api_base_url: Some(input.api_base_url.clone()),
        config: Some(input.customization.to_widget_config()),
    };
    // Struct fields serialize in declaration order, which keeps output stable.
    let literal = escape_script_json(
        &serde_json::to_string(&options).unwrap_or_else(|_| "{}".to_string()),
    );
    let script_src = escape_attribute(&format!("{}{LOADER_SCRIPT_PATH}", input.api_base_url));

    // The stub queues calls made before the loader arrives; the loader drains
    // `q` on startup. The readyState check covers snippets injected after
    // DOMContentLoaded has already fired.
    format!(
        "<!-- FormChat Chatbot Popup -->\n\
         <script>\n\
         \x20 window.{LOADER_GLOBAL} = window.{LOADER_GLOBAL} || {{ q: [], init: function (o) {{ this.q.push(o); }} }};\n\
         \x20 (function () {{\n\
         \x20   function start() {{\n\
         \x20     {LOADER_GLOBAL}.init({literal});\n\
         \x20   }}\n\
         \x20   if (document.readyState === 'loading') {{\n\
         \x20     document.addEventListener('DOMContentLoaded', start);\n\
         \x20   }} else {{\n\
         \x20     start();\n\
         \x20   }}\n\
         \x20 }})();\n\
         </script>\n\
         <script src=\"{script_src}\" async></script>"
    )
}

fn render_iframe(input: &ValidatedInput<'_>) -> String {
    let src = escape_attribute(&frame_url(&input.api_base_url, input.chatbot_id));
    let title = escape_attribute(&input.customization.bot_name);
    let height = input.customization.size.iframe_height();

    format!(
        "<!-- FormChat Chatbot IFrame -->\n\
         <iframe\n\
         \x20 src=\"{src}\"\n\
         \x20 title=\"{title}\"\n\
         \x20 width=\"100%\"\n\
         \x20 height=\"{height}px\"\n\
         \x20 frameborder=\"0\"\n\
         \x20 style=\"border: none; border-radius: 8px;\"\n\
         ></iframe>"
    )
}
