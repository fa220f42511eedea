//! Floating chrome: container, toggle button with its two glyphs, and the
//! panel that hosts the session frame.
//!
//! Everything is built through [`HostDocument`]. Operator text (bot name and
//! welcome message) only ever becomes a text node. Colors reaching this module
//! have already been resolved to valid tokens, so they are safe as style
//! values.
//!
//! The chrome lives in the host page's cascade. Each element gets an explicit
//! reset of the box properties host stylesheets most often target, which
//! narrows but does not remove the collision surface.

use formchat_types::embed::EffectiveCustomization;

use super::document::{HostDocument, NodeId};
use super::state::{Effect, ToggleState};

const EDGE_OFFSET: &str = "20px";
const PANEL_OFFSET: &str = "80px";
const BUTTON_SIZE: &str = "60px";
const HIDDEN_OFFSET: &str = "translateY(20px)";
const Z_INDEX: &str = "2147483000";
const FONT_STACK: &str = "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, \"Helvetica Neue\", Arial, sans-serif";

pub fn container_id(chatbot_id: &str) -> String {
    format!("formchat-widget-{chatbot_id}")
}

pub fn panel_id(chatbot_id: &str) -> String {
    format!("formchat-panel-{chatbot_id}")
}

pub fn button_id(chatbot_id: &str) -> String {
    format!("formchat-button-{chatbot_id}")
}

/// Render-tree handles owned by one widget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chrome {
    pub container: NodeId,
    pub panel: NodeId,
    /// Panel region below the header; the session frame goes here.
    pub frame_slot: NodeId,
    pub button: NodeId,
    pub open_glyph: NodeId,
    pub close_glyph: NodeId,
}

impl Chrome {
    /// Build the chrome as a detached subtree rooted at `container`.
    ///
    /// The caller inserts the session frame into `frame_slot` and then
    /// attaches `container` to the page in one step.
    pub fn render<D: HostDocument>(
        doc: &mut D,
        chatbot_id: &str,
        customization: &EffectiveCustomization,
    ) -> Self {
        let position = customization.position;
        let (width, height) = customization.size.panel_dimensions();
        let (width, height) = (format!("{width}px"), format!("{height}px"));

        let container = doc.create_element("div");
        doc.set_attribute(container, "id", &container_id(chatbot_id));
        doc.set_attribute(container, "data-formchat-id", chatbot_id);
        reset_box(doc, container);
        set_styles(
            doc,
            container,
            &[
                ("position", "fixed"),
                ("bottom", EDGE_OFFSET),
                (position.edge(), EDGE_OFFSET),
                (position.opposite_edge(), "auto"),
                ("z-index", Z_INDEX),
            ],
        );

        let panel = doc.create_element("div");
        doc.set_attribute(panel, "id", &panel_id(chatbot_id));
        doc.set_attribute(panel, "role", "dialog");
        doc.set_attribute(panel, "aria-label", &customization.bot_name);
        reset_box(doc, panel);
        set_styles(
            doc,
            panel,
            &[
                ("position", "absolute"),
                ("bottom", PANEL_OFFSET),
                (position.edge(), "0"),
                (position.opposite_edge(), "auto"),
                ("width", width.as_str()),
                ("height", height.as_str()),
                ("background-color", "#ffffff"),
                ("border-radius", "12px"),
                ("box-shadow", "0 8px 32px rgba(0,0,0,0.15)"),
                ("overflow", "hidden"),
                ("flex-direction", "column"),
                ("display", "none"),
                ("opacity", "0"),
                ("transform", HIDDEN_OFFSET),
                ("transition", "opacity 0.3s, transform 0.3s"),
            ],
        );

        let header = render_header(doc, customization);
        doc.append_child(panel, header);

        let frame_slot = doc.create_element("div");
        reset_box(doc, frame_slot);
        set_styles(doc, frame_slot, &[("flex", "1 1 auto"), ("min-height", "0")]);
        doc.append_child(panel, frame_slot);

        let button = doc.create_element("button");
        doc.set_attribute(button, "id", &button_id(chatbot_id));
        doc.set_attribute(button, "type", "button");
        reset_box(doc, button);
        set_styles(
            doc,
            button,
            &[
                ("width", BUTTON_SIZE),
                ("height", BUTTON_SIZE),
                ("border-radius", "50%"),
                ("background-color", customization.primary_color.as_str()),
                ("color", "#ffffff"),
                ("border", "none"),
                ("cursor", "pointer"),
                ("box-shadow", "0 4px 12px rgba(0,0,0,0.15)"),
                ("display", "flex"),
                ("align-items", "center"),
                ("justify-content", "center"),
                ("transition", "transform 0.2s"),
            ],
        );

        let open_glyph = render_open_glyph(doc);
        let close_glyph = render_close_glyph(doc);
        doc.append_child(button, open_glyph);
        doc.append_child(button, close_glyph);

        doc.append_child(container, panel);
        doc.append_child(container, button);

        let chrome = Self {
            container,
            panel,
            frame_slot,
            button,
            open_glyph,
            close_glyph,
        };
        chrome.sync(doc, ToggleState::Closed);
        chrome
    }

    /// Apply one visual effect. Timer effects are not visual and are ignored.
    pub fn apply<D: HostDocument>(&self, doc: &mut D, effect: Effect) {
        match effect {
            Effect::AttachPanel => {
                doc.set_style(self.panel, "opacity", "0");
                doc.set_style(self.panel, "transform", HIDDEN_OFFSET);
                doc.set_style(self.panel, "display", "flex");
            }
            Effect::EnterPose => {
                doc.set_style(self.panel, "opacity", "1");
                doc.set_style(self.panel, "transform", "translateY(0)");
            }
            Effect::ExitPose => {
                doc.set_style(self.panel, "opacity", "0");
                doc.set_style(self.panel, "transform", HIDDEN_OFFSET);
            }
            Effect::DetachPanel => doc.set_style(self.panel, "display", "none"),
            Effect::CancelPending | Effect::Schedule { .. } => {}
        }
    }

    /// Bring the button glyph and accessibility attributes in line with `state`.
    pub fn sync<D: HostDocument>(&self, doc: &mut D, state: ToggleState) {
        let closing_glyph = state.shows_close_glyph();
        let (shown, hidden) = if closing_glyph {
            (self.close_glyph, self.open_glyph)
        } else {
            (self.open_glyph, self.close_glyph)
        };
        doc.set_style(shown, "display", "block");
        doc.set_style(hidden, "display", "none");
        doc.set_attribute(
            self.button,
            "aria-label",
            if closing_glyph { "Close chat" } else { "Open chat" },
        );
        doc.set_attribute(
            self.button,
            "aria-expanded",
            if closing_glyph { "true" } else { "false" },
        );
    }
}

fn set_styles<D: HostDocument>(doc: &mut D, node: NodeId, styles: &[(&str, &str)]) {
    for (property, value) in styles {
        doc.set_style(node, property, value);
    }
}

fn reset_box<D: HostDocument>(doc: &mut D, node: NodeId) {
    set_styles(
        doc,
        node,
        &[
            ("margin", "0"),
            ("padding", "0"),
            ("box-sizing", "border-box"),
            ("line-height", "normal"),
            ("font-family", FONT_STACK),
            ("font-size", "14px"),
            ("text-align", "left"),
            ("float", "none"),
        ],
    );
}

fn render_header<D: HostDocument>(doc: &mut D, customization: &EffectiveCustomization) -> NodeId {
    let gradient = format!(
        "linear-gradient(135deg, {}, {})",
        customization.primary_color, customization.secondary_color
    );
    let header = doc.create_element("div");
    reset_box(doc, header);
    set_styles(
        doc,
        header,
        &[
            ("flex", "0 0 auto"),
            ("padding", "12px 16px"),
            ("color", "#ffffff"),
            ("background", gradient.as_str()),
        ],
    );

    let title = doc.create_element("strong");
    reset_box(doc, title);
    set_styles(doc, title, &[("display", "block"), ("font-size", "16px"), ("font-weight", "600")]);
    let title_text = doc.create_text_node(&customization.bot_name);
    doc.append_child(title, title_text);

    let welcome = doc.create_element("p");
    reset_box(doc, welcome);
    set_styles(doc, welcome, &[("margin-top", "4px"), ("font-size", "13px"), ("opacity", "0.9")]);
    let welcome_text = doc.create_text_node(&customization.welcome_message);
    doc.append_child(welcome, welcome_text);

    doc.append_child(header, title);
    doc.append_child(header, welcome);
    header
}

fn svg<D: HostDocument>(doc: &mut D) -> NodeId {
    let node = doc.create_element("svg");
    for (name, value) in [
        ("width", "24"),
        ("height", "24"),
        ("viewBox", "0 0 24 24"),
        ("fill", "none"),
        ("stroke", "currentColor"),
        ("stroke-width", "2"),
        ("stroke-linecap", "round"),
        ("stroke-linejoin", "round"),
        ("aria-hidden", "true"),
    ] {
        doc.set_attribute(node, name, value);
    }
    node
}

/// Chat bubble.
fn render_open_glyph<D: HostDocument>(doc: &mut D) -> NodeId {
    let glyph = svg(doc);
    doc.set_attribute(glyph, "data-glyph", "open");
    let path = doc.create_element("path");
    doc.set_attribute(
        path,
        "d",
        "M21 15a2 2 0 0 1-2 2H7l-4 4V5a2 2 0 0 1 2-2h14a2 2 0 0 1 2 2z",
    );
    doc.append_child(glyph, path);
    glyph
}

/// Cross.
fn render_close_glyph<D: HostDocument>(doc: &mut D) -> NodeId {
    let glyph = svg(doc);
    doc.set_attribute(glyph, "data-glyph", "close");
    for (x1, y1, x2, y2) in [("18", "6", "6", "18"), ("6", "6", "18", "18")] {
        let line = doc.create_element("line");
        doc.set_attribute(line, "x1", x1);
        doc.set_attribute(line, "y1", y1);
        doc.set_attribute(line, "x2", x2);
        doc.set_attribute(line, "y2", y2);
        doc.append_child(glyph, line);
    }
    glyph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::customization::merge_widget_config;
    use crate::widget::document::MemoryDocument;
    use formchat_types::chatbot::Position;

    fn render(position: Position) -> (MemoryDocument, Chrome) {
        let mut doc = MemoryDocument::new();
        let mut customization = merge_widget_config(None);
        customization.position = position;
        let chrome = Chrome::render(&mut doc, "bot_x", &customization);
        let body = doc.body();
        doc.append_child(body, chrome.container);
        (doc, chrome)
    }

    #[test]
    fn test_bottom_right_anchoring() {
        let (doc, chrome) = render(Position::BottomRight);
        assert_eq!(doc.style(chrome.container, "right"), Some("20px"));
        assert_eq!(doc.style(chrome.container, "left"), Some("auto"));
        assert_eq!(doc.style(chrome.panel, "right"), Some("0"));
        assert_eq!(doc.style(chrome.panel, "left"), Some("auto"));
    }

    #[test]
    fn test_bottom_left_mirrors() {
        let (doc, chrome) = render(Position::BottomLeft);
        assert_eq!(doc.style(chrome.container, "left"), Some("20px"));
        assert_eq!(doc.style(chrome.container, "right"), Some("auto"));
        assert_eq!(doc.style(chrome.panel, "left"), Some("0"));
    }

    #[test]
    fn test_initial_render_is_closed() {
        let (doc, chrome) = render(Position::BottomRight);
        assert!(!doc.is_rendered(chrome.panel));
        assert!(doc.is_rendered(chrome.open_glyph));
        assert!(!doc.is_rendered(chrome.close_glyph));
        assert_eq!(doc.attribute(chrome.button, "aria-expanded"), Some("false"));
    }

    #[test]
    fn test_operator_text_becomes_text_nodes() {
        let mut doc = MemoryDocument::new();
        let mut customization = merge_widget_config(None);
        customization.bot_name = "<img src=x onerror=alert(1)>".to_string();
        let chrome = Chrome::render(&mut doc, "bot_x", &customization);
        let body = doc.body();
        doc.append_child(body, chrome.container);

        assert!(doc.elements_by_tag("img").is_empty());
        assert!(doc
            .text_content(chrome.panel)
            .starts_with("<img src=x onerror=alert(1)>"));
    }

    #[test]
    fn test_effects_move_panel_pose() {
        let (mut doc, chrome) = render(Position::BottomRight);
        chrome.apply(&mut doc, Effect::AttachPanel);
        assert!(doc.is_rendered(chrome.panel));
        assert_eq!(doc.style(chrome.panel, "display"), Some("flex"));
        assert_eq!(doc.style(chrome.panel, "flex-direction"), Some("column"));
        assert_eq!(doc.style(chrome.panel, "opacity"), Some("0"));

        chrome.apply(&mut doc, Effect::EnterPose);
        assert_eq!(doc.style(chrome.panel, "opacity"), Some("1"));
        assert_eq!(doc.style(chrome.panel, "transform"), Some("translateY(0)"));

        chrome.apply(&mut doc, Effect::DetachPanel);
        assert!(!doc.is_rendered(chrome.panel));
    }
}
