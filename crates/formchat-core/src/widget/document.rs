//! Host document port.
//!
//! The widget never writes markup strings into the host page. Everything it
//! shows is built through this structured interface: elements, attributes,
//! inline styles and text nodes. Text handed to `create_text_node` is never
//! parsed, which is what keeps operator-supplied strings inert.
//!
//! `MemoryDocument` is the only implementation: a headless tree that lets the
//! runtime be driven and inspected without a browser. On real host pages the
//! same behavior ships as the JavaScript loader served at
//! `/chatbot-widget.js`, which mirrors this runtime's ids, validation and
//! toggle timing.

use std::collections::BTreeMap;

/// Handle to a node owned by a `HostDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Structured access to the page the widget is embedded in.
pub trait HostDocument {
    /// The `<body>` element.
    fn body(&self) -> NodeId;

    /// First element connected to the document with the given `id` attribute.
    fn get_element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Create a detached text node. The text is never interpreted as markup.
    fn create_text_node(&mut self, text: &str) -> NodeId;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Set one inline style property.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Append `child` to `parent`, detaching it from any previous parent.
    /// No-op if `child` is `parent` or one of its ancestors.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Remove `child` from `parent`. No-op if it is not a child of `parent`.
    fn remove_child(&mut self, parent: NodeId, child: NodeId);

    fn parent_node(&self, node: NodeId) -> Option<NodeId>;
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        style: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory document tree.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    body: NodeId,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create a document with an empty `<body>`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            body: NodeId(0),
        };
        doc.body = doc.push(NodeKind::Element {
            tag: "body".to_string(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
        });
        doc
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { style, .. } => style.get(property).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.node(node) else { return };
        match &n.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &n.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Whether `ancestor` is `node` itself or lies on its parent chain.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether `node` is reachable from `<body>`.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.is_inclusive_ancestor(self.body, node)
    }

    /// Whether `node` takes part in layout: connected, and neither it nor any
    /// ancestor has `display: none`.
    pub fn is_rendered(&self, node: NodeId) -> bool {
        if !self.is_connected(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if self.style(id, "display") == Some("none") {
                return false;
            }
            current = self.parent(id);
        }
        true
    }

    /// All connected elements carrying `id`, in document order.
    pub fn elements_with_id(&self, id: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(self.body, &mut |node| {
            if self.attribute(node, "id") == Some(id) {
                found.push(node);
            }
        });
        found
    }

    /// All connected elements with the given tag, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(self.body, &mut |node| {
            if self.tag(node) == Some(tag) {
                found.push(node);
            }
        });
        found
    }

    fn walk(&self, node: NodeId, visit: &mut dyn FnMut(NodeId)) {
        visit(node);
        for child in self.children(node) {
            self.walk(*child, visit);
        }
    }
}

impl HostDocument for MemoryDocument {
    fn body(&self) -> NodeId {
        self.body
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements_with_id(id).into_iter().next()
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
        })
    }

    fn create_text_node(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(Node {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(Node {
            kind: NodeKind::Element { style, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            style.insert(property.to_string(), value.to_string());
        }
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return;
        }
        if self.is_inclusive_ancestor(child, parent) {
            return;
        }
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.remove_child(old_parent, child);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(p) = self.nodes.get_mut(parent.0) else { return };
        let before = p.children.len();
        p.children.retain(|c| *c != child);
        if p.children.len() != before {
            self.nodes[child.0].parent = None;
        }
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_elements_are_not_found_by_id() {
        let mut doc = MemoryDocument::new();
        let div = doc.create_element("div");
        doc.set_attribute(div, "id", "x");
        assert!(doc.get_element_by_id("x").is_none());

        let body = doc.body();
        doc.append_child(body, div);
        assert_eq!(doc.get_element_by_id("x"), Some(div));
    }

    #[test]
    fn test_text_nodes_stay_text() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let p = doc.create_element("p");
        let text = doc.create_text_node("<img src=x onerror=alert(1)>");
        doc.append_child(p, text);
        doc.append_child(body, p);

        assert!(doc.elements_by_tag("img").is_empty());
        assert_eq!(doc.text_content(p), "<img src=x onerror=alert(1)>");
    }

    #[test]
    fn test_display_none_ancestor_hides_descendants() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(outer, inner);
        doc.append_child(body, outer);
        assert!(doc.is_rendered(inner));

        doc.set_style(outer, "display", "none");
        assert!(!doc.is_rendered(inner));
        assert!(doc.is_connected(inner));
    }

    #[test]
    fn test_append_reparents() {
        let mut doc = MemoryDocument::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(a, child);
        doc.append_child(b, child);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[child]);
        assert_eq!(doc.parent(child), Some(b));
    }

    #[test]
    fn test_append_refuses_to_create_cycles() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let outer = doc.create_element("div");
        let inner = doc.create_element("section");
        doc.append_child(body, outer);
        doc.append_child(outer, inner);

        doc.append_child(inner, outer);
        doc.append_child(outer, outer);
        doc.append_child(inner, body);

        assert_eq!(doc.parent(outer), Some(body));
        assert_eq!(doc.parent(inner), Some(outer));
        assert!(doc.children(inner).is_empty());
        assert!(doc.parent(body).is_none());
        assert!(doc.is_connected(inner));
        assert_eq!(doc.elements_by_tag("section"), vec![inner]);
    }
}
