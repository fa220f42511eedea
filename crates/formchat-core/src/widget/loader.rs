//! Widget loader and runtime.
//!
//! `WidgetRuntime` is the page-local entry point behind `FormChat.init`. It
//! owns the host document port, the timer queue and the instance map keyed by
//! `chatbot_id`. Bootstrap failures never propagate to the host page: they are
//! reported on the [`DIAGNOSTIC_TARGET`] tracing target and returned as an
//! `InitOutcome::Rejected` value for the binding to drop.

use std::collections::HashMap;

use formchat_types::embed::BootstrapOptions;
use formchat_types::error::WidgetError;
use formchat_types::chatbot::is_valid_chatbot_id;
use tracing::{debug, trace, warn};

use crate::embed::customization::merge_widget_config;
use crate::embed::escape::normalize_api_base_url;

use super::document::{HostDocument, NodeId};
use super::frame::SessionFrame;
use super::instance::WidgetInstance;
use super::renderer::{Chrome, container_id};
use super::state::{self, Effect, ToggleState, Transition, TransitionStep};
use super::timer::{TimerId, TimerQueue};

/// Tracing target for loader diagnostics.
pub const DIAGNOSTIC_TARGET: &str = "formchat::widget";

/// Result of one `init` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A new instance was rendered.
    Created,
    /// An instance for this `chatbot_id` already exists; nothing was done.
    AlreadyPresent,
    /// The options were unusable; nothing was rendered.
    Rejected(WidgetError),
}

/// Timer payload. Carries the owning instance and the generation it was
/// scheduled under.
#[derive(Debug, Clone)]
struct ScheduledStep {
    chatbot_id: String,
    generation: u64,
    step: TransitionStep,
}

/// Validated bootstrap input.
struct Bootstrap {
    chatbot_id: String,
    api_base_url: String,
}

pub struct WidgetRuntime<D: HostDocument> {
    document: D,
    timers: TimerQueue<ScheduledStep>,
    instances: HashMap<String, WidgetInstance>,
}

impl<D: HostDocument> WidgetRuntime<D> {
    pub fn new(document: D) -> Self {
        Self {
            document,
            timers: TimerQueue::new(),
            instances: HashMap::new(),
        }
    }

    /// Bootstrap one widget instance.
    pub fn init(&mut self, options: BootstrapOptions) -> InitOutcome {
        let bootstrap = match validate_options(&options) {
            Ok(bootstrap) => bootstrap,
            Err(err) => {
                warn!(target: DIAGNOSTIC_TARGET, error = %err, "widget bootstrap rejected");
                return InitOutcome::Rejected(err);
            }
        };

        let chatbot_id = bootstrap.chatbot_id;
        if self.instances.contains_key(&chatbot_id)
            || self
                .document
                .get_element_by_id(&container_id(&chatbot_id))
                .is_some()
        {
            debug!(target: DIAGNOSTIC_TARGET, chatbot_id = %chatbot_id, "widget already present, init ignored");
            return InitOutcome::AlreadyPresent;
        }

        let customization = merge_widget_config(options.config.as_ref());
        let chrome = Chrome::render(&mut self.document, &chatbot_id, &customization);
        let frame = SessionFrame::create(
            &mut self.document,
            chrome.frame_slot,
            &chatbot_id,
            &bootstrap.api_base_url,
            &customization.bot_name,
        );
        let body = self.document.body();
        self.document.append_child(body, chrome.container);

        debug!(
            target: DIAGNOSTIC_TARGET,
            chatbot_id = %chatbot_id,
            position = %customization.position,
            size = %customization.size,
            "widget instance created"
        );

        self.instances.insert(
            chatbot_id.clone(),
            WidgetInstance {
                chatbot_id,
                api_base_url: bootstrap.api_base_url,
                customization,
                state: ToggleState::Closed,
                chrome,
                frame,
                generation: 0,
                pending: None,
            },
        );
        InitOutcome::Created
    }

    /// Bootstrap from a raw options literal. Unparseable input is rejected
    /// like any other bad option.
    pub fn init_json(&mut self, raw: &str) -> InitOutcome {
        match serde_json::from_str::<BootstrapOptions>(raw) {
            Ok(options) => self.init(options),
            Err(e) => {
                let err = WidgetError::MalformedOptions(e.to_string());
                warn!(target: DIAGNOSTIC_TARGET, error = %err, "widget bootstrap rejected");
                InitOutcome::Rejected(err)
            }
        }
    }

    /// Toggle one instance. Returns the new state, or `None` for an unknown id.
    pub fn toggle(&mut self, chatbot_id: &str) -> Option<ToggleState> {
        let current = self.instances.get(chatbot_id)?.state;
        let transition = state::toggle(current);
        if let Some(instance) = self.instances.get_mut(chatbot_id) {
            instance.generation += 1;
        }
        trace!(target: DIAGNOSTIC_TARGET, chatbot_id, from = %current, to = %transition.next, "toggle");
        self.apply(chatbot_id, transition);
        self.state(chatbot_id)
    }

    /// Route a click on `target` to the instance whose button contains it.
    /// Returns whether any instance handled the click.
    pub fn handle_click(&mut self, target: NodeId) -> bool {
        let owner = self
            .instances
            .values()
            .find(|instance| self.is_within(target, instance.chrome.button))
            .map(|instance| instance.chatbot_id.clone());
        match owner {
            Some(chatbot_id) => self.toggle(&chatbot_id).is_some(),
            None => false,
        }
    }

    /// Move the clock to `now_ms`, firing every timer due by then in order.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some((timer, task)) = self.timers.pop_due(now_ms) {
            self.fire(timer, task);
        }
    }

    pub fn advance_by(&mut self, delta_ms: u64) {
        let target = self.timers.now().saturating_add(delta_ms);
        self.advance_to(target);
    }

    /// Current clock reading in milliseconds.
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn state(&self, chatbot_id: &str) -> Option<ToggleState> {
        self.instances.get(chatbot_id).map(|i| i.state)
    }

    pub fn instance(&self, chatbot_id: &str) -> Option<&WidgetInstance> {
        self.instances.get(chatbot_id)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.document.parent_node(id);
        }
        false
    }

    fn fire(&mut self, timer: TimerId, task: ScheduledStep) {
        let Some(instance) = self.instances.get_mut(&task.chatbot_id) else {
            return;
        };
        if instance.generation != task.generation || instance.pending != Some(timer) {
            trace!(target: DIAGNOSTIC_TARGET, chatbot_id = %task.chatbot_id, step = ?task.step, "stale timer discarded");
            return;
        }
        instance.pending = None;

        match state::advance(instance.state, task.step) {
            Some(transition) => self.apply(&task.chatbot_id, transition),
            None => {
                trace!(target: DIAGNOSTIC_TARGET, chatbot_id = %task.chatbot_id, step = ?task.step, "step does not apply to current state");
            }
        }
    }

    fn apply(&mut self, chatbot_id: &str, transition: Transition) {
        let Some(instance) = self.instances.get_mut(chatbot_id) else {
            return;
        };
        instance.state = transition.next;

        for effect in transition.effects {
            match effect {
                Effect::CancelPending => {
                    if let Some(timer) = instance.pending.take() {
                        self.timers.cancel(timer);
                    }
                }
                Effect::Schedule { step, delay_ms } => {
                    let timer = self.timers.schedule(
                        delay_ms,
                        ScheduledStep {
                            chatbot_id: chatbot_id.to_string(),
                            generation: instance.generation,
                            step,
                        },
                    );
                    instance.pending = Some(timer);
                }
                visual => instance.chrome.apply(&mut self.document, visual),
            }
        }

        instance.chrome.sync(&mut self.document, instance.state);
    }
}

fn validate_options(options: &BootstrapOptions) -> Result<Bootstrap, WidgetError> {
    let chatbot_id = options
        .chatbot_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(WidgetError::MissingChatbotId)?;
    if !is_valid_chatbot_id(chatbot_id) {
        return Err(WidgetError::InvalidChatbotId(chatbot_id.to_string()));
    }

    let raw_base = options
        .api_base_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or(WidgetError::MissingApiBaseUrl)?;
    let api_base_url = normalize_api_base_url(raw_base)
        .map_err(|_| WidgetError::InvalidApiBaseUrl(raw_base.to_string()))?;

    Ok(Bootstrap {
        chatbot_id: chatbot_id.to_string(),
        api_base_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::compile;
    use crate::widget::document::MemoryDocument;
    use crate::widget::state::{FRAME_DELAY_MS, TRANSITION_MS};
    use formchat_types::chatbot::{ChatbotConfig, Customization, EmbedType, Position};
    use formchat_types::embed::WidgetConfig;

    const BASE: &str = "https://chat.example.com";

    fn options(id: &str) -> BootstrapOptions {
        BootstrapOptions {
            chatbot_id: Some(id.to_string()),
            api_base_url: Some(BASE.to_string()),
            config: None,
        }
    }

    fn runtime() -> WidgetRuntime<MemoryDocument> {
        WidgetRuntime::new(MemoryDocument::new())
    }

    fn panel_rendered(rt: &WidgetRuntime<MemoryDocument>, id: &str) -> bool {
        let panel = rt.instance(id).unwrap().chrome().panel;
        rt.document().is_rendered(panel)
    }

    /// The literal the compiled popup snippet passes to `FormChat.init`.
    fn popup_literal(position: &str) -> String {
        let config = ChatbotConfig {
            chatbot_id: "bot_1a2b3c4d5e6f".to_string(),
            name: "Contact".to_string(),
            google_form_url: "https://forms.gle/abc".to_string(),
            embed_type: EmbedType::Popup,
            customization: Customization {
                position: position.to_string(),
                ..Default::default()
            },
            is_active: true,
        };
        let popup = compile(&config, BASE).unwrap().popup;
        let start = popup.find("FormChat.init(").unwrap() + "FormChat.init(".len();
        let end = popup[start..].find(");").unwrap() + start;
        popup[start..end].to_string()
    }

    #[test]
    fn test_double_init_yields_one_container() {
        let mut rt = runtime();
        assert_eq!(rt.init(options("bot_a")), InitOutcome::Created);
        assert_eq!(rt.init(options("bot_a")), InitOutcome::AlreadyPresent);

        assert_eq!(rt.document().elements_with_id("formchat-widget-bot_a").len(), 1);
        assert_eq!(rt.document().elements_by_tag("iframe").len(), 1);
        assert_eq!(rt.instance_count(), 1);
    }

    #[test]
    fn test_init_respects_container_already_in_document() {
        let mut doc = MemoryDocument::new();
        let existing = doc.create_element("div");
        doc.set_attribute(existing, "id", "formchat-widget-bot_a");
        let body = doc.body();
        doc.append_child(body, existing);

        let mut rt = WidgetRuntime::new(doc);
        assert_eq!(rt.init(options("bot_a")), InitOutcome::AlreadyPresent);
        assert_eq!(rt.document().elements_with_id("formchat-widget-bot_a").len(), 1);
    }

    #[test]
    fn test_missing_chatbot_id_is_rejected_silently() {
        let mut rt = runtime();
        let outcome = rt.init(BootstrapOptions {
            chatbot_id: None,
            api_base_url: Some(BASE.to_string()),
            config: None,
        });
        assert_eq!(outcome, InitOutcome::Rejected(WidgetError::MissingChatbotId));
        assert_eq!(rt.instance_count(), 0);
        assert!(rt.document().children(rt.document().body()).is_empty());
    }

    #[test]
    fn test_bad_options_are_rejected() {
        let mut rt = runtime();
        assert!(matches!(
            rt.init(options("bot\"><script>")),
            InitOutcome::Rejected(WidgetError::InvalidChatbotId(_))
        ));
        assert_eq!(
            rt.init(BootstrapOptions {
                chatbot_id: Some("bot_a".to_string()),
                api_base_url: None,
                config: None,
            }),
            InitOutcome::Rejected(WidgetError::MissingApiBaseUrl)
        );
        assert!(matches!(
            rt.init(BootstrapOptions {
                chatbot_id: Some("bot_a".to_string()),
                api_base_url: Some("javascript:alert(1)".to_string()),
                config: None,
            }),
            InitOutcome::Rejected(WidgetError::InvalidApiBaseUrl(_))
        ));
        assert!(matches!(
            rt.init_json("{not json"),
            InitOutcome::Rejected(WidgetError::MalformedOptions(_))
        ));
        assert_eq!(rt.instance_count(), 0);
    }

    #[test]
    fn test_full_cycle_returns_to_closed() {
        let mut rt = runtime();
        rt.init(options("bot_a"));
        assert_eq!(rt.state("bot_a"), Some(ToggleState::Closed));
        assert!(!panel_rendered(&rt, "bot_a"));

        assert_eq!(rt.toggle("bot_a"), Some(ToggleState::Opening));
        assert!(panel_rendered(&rt, "bot_a"));
        rt.advance_by(FRAME_DELAY_MS);
        let panel = rt.instance("bot_a").unwrap().chrome().panel;
        assert_eq!(rt.document().style(panel, "opacity"), Some("1"));
        rt.advance_by(TRANSITION_MS);
        assert_eq!(rt.state("bot_a"), Some(ToggleState::Open));

        assert_eq!(rt.toggle("bot_a"), Some(ToggleState::Closing));
        assert!(panel_rendered(&rt, "bot_a"));
        rt.advance_by(TRANSITION_MS - 1);
        assert_eq!(rt.state("bot_a"), Some(ToggleState::Closing));
        rt.advance_by(1);

        assert_eq!(rt.state("bot_a"), Some(ToggleState::Closed));
        assert!(!panel_rendered(&rt, "bot_a"));
        assert!(!rt.instance("bot_a").unwrap().has_pending_timer());
    }

    #[test]
    fn test_glyph_and_aria_follow_state() {
        let mut rt = runtime();
        rt.init(options("bot_a"));
        let chrome = rt.instance("bot_a").unwrap().chrome().clone();

        rt.toggle("bot_a");
        assert!(rt.document().is_rendered(chrome.close_glyph));
        assert!(!rt.document().is_rendered(chrome.open_glyph));
        assert_eq!(rt.document().attribute(chrome.button, "aria-expanded"), Some("true"));

        rt.advance_by(1_000);
        rt.toggle("bot_a");
        assert!(rt.document().is_rendered(chrome.open_glyph));
        assert_eq!(rt.document().attribute(chrome.button, "aria-label"), Some("Open chat"));
    }

    #[test]
    fn test_instances_toggle_independently() {
        let mut rt = runtime();
        rt.init(options("bot_a"));
        rt.init(options("bot_b"));
        assert_eq!(rt.document().elements_by_tag("iframe").len(), 2);

        rt.toggle("bot_a");
        rt.advance_by(1_000);
        assert_eq!(rt.state("bot_a"), Some(ToggleState::Open));
        assert_eq!(rt.state("bot_b"), Some(ToggleState::Closed));
        assert!(!panel_rendered(&rt, "bot_b"));

        rt.toggle("bot_b");
        rt.toggle("bot_a");
        rt.advance_by(1_000);
        assert_eq!(rt.state("bot_a"), Some(ToggleState::Closed));
        assert_eq!(rt.state("bot_b"), Some(ToggleState::Open));
    }

    #[test]
    fn test_click_routes_to_owning_instance() {
        let mut rt = runtime();
        rt.init(options("bot_a"));
        rt.init(options("bot_b"));
        let glyph = rt.instance("bot_b").unwrap().chrome().open_glyph;
        let path = rt.document().children(glyph)[0];

        assert!(rt.handle_click(path));
        assert_eq!(rt.state("bot_b"), Some(ToggleState::Opening));
        assert_eq!(rt.state("bot_a"), Some(ToggleState::Closed));

        let body = rt.document().body();
        assert!(!rt.handle_click(body));
    }

    #[test]
    fn test_bottom_left_from_compiled_popup() {
        let mut rt = runtime();
        assert_eq!(rt.init_json(&popup_literal("bottom-left")), InitOutcome::Created);
        let container = rt.instance("bot_1a2b3c4d5e6f").unwrap().chrome().container;
        assert_eq!(rt.document().style(container, "left"), Some("20px"));
        assert_eq!(rt.document().style(container, "right"), Some("auto"));
    }

    #[test]
    fn test_mistyped_customization_falls_back_per_field() {
        let mut rt = runtime();
        let raw = r#"{"chatbotId":"bot_a","apiBaseUrl":"https://chat.example.com","config":{"primaryColor":123,"botName":false,"position":"bottom-left"}}"#;
        assert_eq!(rt.init_json(raw), InitOutcome::Created);

        let instance = rt.instance("bot_a").unwrap();
        let defaults = merge_widget_config(None);
        assert_eq!(instance.customization().primary_color, "#7c3aed");
        assert_eq!(instance.customization().bot_name, defaults.bot_name);
        assert_eq!(instance.customization().position, Position::BottomLeft);
        let container = instance.chrome().container;
        assert_eq!(rt.document().style(container, "left"), Some("20px"));
    }

    #[test]
    fn test_omitted_position_anchors_right() {
        let mut rt = runtime();
        rt.init(BootstrapOptions {
            config: Some(WidgetConfig {
                primary_color: Some(String::new()),
                ..Default::default()
            }),
            ..options("bot_a")
        });
        let chrome = rt.instance("bot_a").unwrap().chrome().clone();
        assert_eq!(rt.document().style(chrome.container, "right"), Some("20px"));
        assert_eq!(
            rt.document().style(chrome.button, "background-color"),
            Some("#7c3aed")
        );

        let mut rt = runtime();
        rt.init_json(&popup_literal(""));
        let container = rt.instance("bot_1a2b3c4d5e6f").unwrap().chrome().container;
        assert_eq!(rt.document().style(container, "right"), Some("20px"));
    }

    #[test]
    fn test_frame_is_reused_across_cycles() {
        let mut rt = runtime();
        rt.init(options("bot_a"));
        let frame = rt.instance("bot_a").unwrap().frame().node();

        for _ in 0..3 {
            rt.toggle("bot_a");
            rt.advance_by(1_000);
            rt.toggle("bot_a");
            rt.advance_by(1_000);
        }

        let frames = rt.document().elements_with_id("formchat-frame-bot_a");
        assert_eq!(frames, vec![frame]);
        assert!(rt.document().is_connected(frame));
        assert_eq!(
            rt.document().attribute(frame, "src"),
            Some("https://chat.example.com/embed/bot_a")
        );
    }

    #[test]
    fn test_rapid_retoggle_never_leaves_half_state() {
        let mut rt = runtime();
        rt.init(options("bot_a"));

        // Open, then close before the frame tick fires.
        rt.toggle("bot_a");
        rt.advance_by(5);
        assert_eq!(rt.toggle("bot_a"), Some(ToggleState::Closing));
        rt.advance_by(1_000);
        assert_eq!(rt.state("bot_a"), Some(ToggleState::Closed));
        assert!(!panel_rendered(&rt, "bot_a"));

        // Open, close mid-transition, reopen mid-close.
        rt.toggle("bot_a");
        rt.advance_by(100);
        rt.toggle("bot_a");
        rt.advance_by(100);
        assert_eq!(rt.toggle("bot_a"), Some(ToggleState::Opening));
        rt.advance_by(1_000);

        assert_eq!(rt.state("bot_a"), Some(ToggleState::Open));
        assert!(panel_rendered(&rt, "bot_a"));
        let panel = rt.instance("bot_a").unwrap().chrome().panel;
        assert_eq!(rt.document().style(panel, "opacity"), Some("1"));
    }

    #[test]
    fn test_unknown_id_toggle_is_none() {
        let mut rt = runtime();
        assert_eq!(rt.toggle("nope"), None);
    }
}
