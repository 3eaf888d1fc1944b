//! Node types of the resource graph.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Process-wide source of node identifiers; monotonic, never reused
/// within a run.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a node within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A scalar configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Number(f64),
    Bool(bool),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One segment of an attribute path into a nested value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Attribute {
    Key(String),
    Index(usize),
}

impl Attribute {
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }
}

/// A declared attribute value: a scalar, a pointer at a [`Reference`]
/// node, or an arbitrarily nested list/mapping of the same. Every leaf is
/// either a literal or a symbolic reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Scalar(Scalar),
    Ref(NodeId),
    List(Vec<PropertyValue>),
    Map(BTreeMap<String, PropertyValue>),
}

/// Where a reference points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RefTarget {
    /// Unresolved: the address string as written in source.
    Named(String),
    /// Resolved to a node in the same graph. Non-owning: dropping the
    /// graph drops the target with it.
    Node(NodeId),
}

impl RefTarget {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Node(_))
    }
}

/// A symbolic pointer from one property position to another node's value.
#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    pub id: NodeId,
    pub target: RefTarget,
    /// Path of attribute segments into the target's nested value.
    pub property: Vec<Attribute>,
}

/// The value exported by an [`Output`].
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    Literal(String),
    Ref(NodeId),
}

/// A named value exported from the configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Output {
    pub id: NodeId,
    pub name: String,
    pub r#type: String,
    pub value: OutputValue,
}

/// One declared infrastructure resource. `properties` holds exactly the
/// attributes declared in source; no defaults are injected at this layer.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceNode {
    pub id: NodeId,
    pub name: String,
    pub r#type: String,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl ResourceNode {
    /// The address a reference uses to point at this resource.
    pub fn address(&self) -> String {
        format!("{}.{}", self.r#type, self.name)
    }
}

/// Any node of the graph.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Resource(ResourceNode),
    Output(Output),
    Reference(Reference),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Resource(r) => r.id,
            Node::Output(o) => o.id,
            Node::Reference(r) => r.id,
        }
    }
}
