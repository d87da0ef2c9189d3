//! Arena storage for a parsed document.
//!
//! Every node lives in a single `Vec<Node>` and refers to its first child and
//! next sibling by index. Node 0 is always the document root. Nodes are only
//! ever appended, so a `NodeId` handed out by a document stays valid for the
//! document's lifetime.

use serde::Serialize;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Tag name for elements, character data for text and comments.
    pub data: String,
    pub attributes: Vec<Attribute>,
    #[serde(skip)]
    pub first_child: Option<NodeId>,
    #[serde(skip)]
    pub next_sibling: Option<NodeId>,
    #[serde(skip)]
    last_child: Option<NodeId>,
}

impl Node {
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Element => Some(&self.data),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Text | NodeKind::Comment => Some(&self.data),
            _ => None,
        }
    }

    /// Linear scan over the attribute list. With duplicate keys the first one wins.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only its root node.
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(Node {
            id: NodeId(0),
            kind: NodeKind::Document,
            data: String::new(),
            attributes: Vec::new(),
            first_child: None,
            next_sibling: None,
            last_child: None,
        });
        Self { nodes }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A document always holds at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            document: self,
            next: self[id].first_child,
        }
    }

    /// Append an element with the given attributes as the last child of `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> NodeId {
        self.append(parent, NodeKind::Element, tag.into(), attributes)
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.append(parent, NodeKind::Text, text.into(), Vec::new())
    }

    pub fn append_comment(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.append(parent, NodeKind::Comment, text.into(), Vec::new())
    }

    /// Append a node of any kind as the last child of `parent`.
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn append(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        data: String,
        attributes: Vec<Attribute>,
    ) -> NodeId {
        assert!(parent.index() < self.nodes.len(), "unknown parent {parent:?}");

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            kind,
            data,
            attributes,
            first_child: None,
            next_sibling: None,
            last_child: None,
        });

        match self.nodes[parent.index()].last_child {
            Some(prev) => self.nodes[prev.index()].next_sibling = Some(id),
            None => self.nodes[parent.index()].first_child = Some(id),
        }
        self.nodes[parent.index()].last_child = Some(id);
        id
    }
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

/// Iterator over the direct children of a node, following sibling links.
pub struct Children<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.document[self.next?];
        self.next = node.next_sibling;
        Some(node)
    }
}
