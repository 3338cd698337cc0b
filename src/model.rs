use std::borrow::Borrow;
use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Identifier of the synthetic root node.
pub const ROOT_ID: &str = "root";
/// Prefix shared by all commodity node identifiers.
pub const COMMODITY_PREFIX: &str = "commodity:";

/// Identifier of a node, unique within one tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The root sentinel (`"root"`).
    pub fn root() -> Self {
        Self(ROOT_ID.to_owned())
    }

    /// Builds the identifier of a commodity node from its code.
    pub fn commodity(code: &str) -> Self {
        Self(format!("{COMMODITY_PREFIX}{code}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the root sentinel.
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    /// Returns the commodity code if this is a commodity identifier.
    pub fn commodity_code(&self) -> Option<&str> {
        self.0.strip_prefix(COMMODITY_PREFIX)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One node of the loaded category tree.
///
/// The shape is fixed once loaded: children are never added or removed at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    href: Option<String>,
    children: Vec<Node>,
}

impl Node {
    /// Creates a leaf node without a link.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            href: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Folder nodes have at least one child and are the only toggleable nodes.
    pub const fn is_folder(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// A payload node dropped at parse time because it had no identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedNode {
    /// Identifier of the parent that listed the node.
    pub parent: NodeId,
    /// Position of the node among the parent's children in the payload.
    pub position: usize,
    /// Number of nodes dropped with it (the whole subtree, including itself).
    pub dropped: usize,
}

/// A parsed tree payload: the root node plus everything rejected while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreePayload {
    pub root: Node,
    pub rejected: Vec<RejectedNode>,
}

impl TreePayload {
    pub const fn new(root: Node) -> Self {
        Self {
            root,
            rejected: Vec::new(),
        }
    }

    /// Parses a `{ "treeData": Node }` response body.
    pub fn from_json(body: &str) -> Result<Self, LoadError> {
        let raw: RawPayload = serde_json::from_str(body)?;
        Self::from_raw(raw.tree_data)
    }

    /// Parses a `{ "treeData": Node }` response body from bytes.
    pub fn from_slice(body: &[u8]) -> Result<Self, LoadError> {
        let raw: RawPayload = serde_json::from_slice(body)?;
        Self::from_raw(raw.tree_data)
    }

    fn from_raw(raw: RawNode) -> Result<Self, LoadError> {
        let Some(id) = raw.id().map(NodeId::new) else {
            return Err(LoadError::MissingRoot);
        };
        let mut rejected = Vec::new();
        let root = convert_node(id, raw.href, raw.children, &mut rejected);
        for node in &rejected {
            tracing::warn!(
                parent = %node.parent,
                position = node.position,
                dropped = node.dropped,
                "tree payload node has a missing or invalid node_id; subtree skipped"
            );
        }
        Ok(Self { root, rejected })
    }
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(rename = "treeData")]
    tree_data: RawNode,
}

#[derive(Deserialize)]
struct RawNode {
    #[serde(default)]
    node_id: Option<RawNodeId>,
    #[serde(default)]
    href: Option<RawHref>,
    #[serde(default)]
    children: Vec<RawNode>,
}

impl RawNode {
    // Only non-empty strings identify a node.
    fn id(&self) -> Option<&str> {
        match &self.node_id {
            Some(RawNodeId::Text(id)) if !id.is_empty() => Some(id),
            _ => None,
        }
    }

    fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeId {
    Text(String),
    Invalid(IgnoredAny),
}

// The server sends `false` instead of null when a node has no link.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawHref {
    Link(String),
    Flag(bool),
}

fn convert_node(
    id: NodeId,
    href: Option<RawHref>,
    raw_children: Vec<RawNode>,
    rejected: &mut Vec<RejectedNode>,
) -> Node {
    let href = match href {
        Some(RawHref::Link(link)) if !link.is_empty() => Some(link),
        _ => None,
    };
    let mut children = Vec::with_capacity(raw_children.len());
    for (position, child) in raw_children.into_iter().enumerate() {
        match child.id().map(NodeId::new) {
            Some(child_id) => {
                children.push(convert_node(child_id, child.href, child.children, rejected));
            }
            None => rejected.push(RejectedNode {
                parent: id.clone(),
                position,
                dropped: child.subtree_len(),
            }),
        }
    }
    Node { id, href, children }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_payload_with_false_href() {
        let body = r#"{
            "treeData": {
                "node_id": "root",
                "href": false,
                "children": [
                    { "node_id": "heading:8471", "href": "/heading/8471", "children": [
                        { "node_id": "commodity:8471.30", "href": false, "children": [] }
                    ]},
                    { "node_id": "heading:8472" }
                ]
            }
        }"#;

        let payload = TreePayload::from_json(body).unwrap();

        assert!(payload.rejected.is_empty());
        assert_eq!(payload.root.id().as_str(), "root");
        assert_eq!(payload.root.href(), None);
        assert_eq!(payload.root.subtree_len(), 4);
        let heading = &payload.root.children()[0];
        assert_eq!(heading.href(), Some("/heading/8471"));
        assert_eq!(
            heading.children()[0].id().commodity_code(),
            Some("8471.30")
        );
        assert!(!payload.root.children()[1].is_folder());
    }

    #[test]
    fn rejects_nodes_without_identifier() {
        let body = r#"{
            "treeData": {
                "node_id": "root",
                "children": [
                    { "node_id": "a" },
                    { "href": "/orphan", "children": [ { "node_id": "lost" } ] }
                ]
            }
        }"#;

        let payload = TreePayload::from_json(body).unwrap();

        assert_eq!(payload.root.children().len(), 1);
        assert_eq!(
            payload.rejected,
            vec![RejectedNode {
                parent: NodeId::root(),
                position: 1,
                dropped: 2,
            }]
        );
    }

    #[test]
    fn non_string_identifiers_are_rejected_per_node() {
        let body = r#"{
            "treeData": {
                "node_id": "root",
                "children": [
                    { "node_id": 8471, "children": [ { "node_id": "lost" } ] },
                    { "node_id": "b" },
                    { "node_id": null }
                ]
            }
        }"#;

        let payload = TreePayload::from_json(body).unwrap();

        assert_eq!(payload.root.children().len(), 1);
        assert_eq!(payload.root.children()[0].id().as_str(), "b");
        let positions: Vec<_> = payload
            .rejected
            .iter()
            .map(|node| (node.position, node.dropped))
            .collect();
        assert_eq!(positions, vec![(0, 2), (2, 1)]);
    }

    #[test]
    fn numeric_root_identifier_is_missing_root() {
        let body = r#"{ "treeData": { "node_id": 1, "children": [] } }"#;

        assert!(matches!(
            TreePayload::from_json(body),
            Err(LoadError::MissingRoot)
        ));
    }

    #[test]
    fn root_without_identifier_is_an_error() {
        let body = r#"{ "treeData": { "children": [] } }"#;

        assert!(matches!(
            TreePayload::from_json(body),
            Err(LoadError::MissingRoot)
        ));
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        assert!(matches!(
            TreePayload::from_slice(b"{ not json"),
            Err(LoadError::Decode(_))
        ));
    }

    #[test]
    fn commodity_ids_follow_prefix_convention() {
        let id = NodeId::commodity("8471.30");

        assert_eq!(id.as_str(), "commodity:8471.30");
        assert!(!id.is_root());
        assert!(NodeId::root().is_root());
        assert_eq!(NodeId::from("heading:01").commodity_code(), None);
    }
}
