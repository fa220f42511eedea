//! Session frame controller.
//!
//! One inline frame per widget instance, created at construction and kept for
//! the lifetime of the page. Closing the panel only takes the panel out of
//! layout; the frame node stays in the tree so the conversation inside it is
//! not reloaded on the next open.
//!
//! Load failures are not observed here. Whatever the frame shows when the
//! conversation cannot be loaded is decided by the content behind the frame.

use crate::embed::frame_url;

use super::document::{HostDocument, NodeId};

/// Id of the frame element for `chatbot_id`.
pub fn frame_element_id(chatbot_id: &str) -> String {
    format!("formchat-frame-{chatbot_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFrame {
    node: NodeId,
    src: String,
}

impl SessionFrame {
    /// Create the frame element inside `parent`.
    pub fn create<D: HostDocument>(
        doc: &mut D,
        parent: NodeId,
        chatbot_id: &str,
        api_base_url: &str,
        title: &str,
    ) -> Self {
        let src = frame_url(api_base_url, chatbot_id);
        let node = doc.create_element("iframe");
        doc.set_attribute(node, "id", &frame_element_id(chatbot_id));
        doc.set_attribute(node, "src", &src);
        doc.set_attribute(node, "title", title);
        doc.set_attribute(node, "allow", "clipboard-write");
        doc.set_attribute(node, "loading", "lazy");
        for (property, value) in [
            ("width", "100%"),
            ("height", "100%"),
            ("border", "none"),
            ("margin", "0"),
            ("padding", "0"),
            ("display", "block"),
        ] {
            doc.set_style(node, property, value);
        }
        doc.append_child(parent, node);
        Self { node, src }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}
