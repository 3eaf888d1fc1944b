//! Graph construction and reference resolution.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::node::{
    Attribute, Node, NodeId, Output, OutputValue, PropertyValue, RefTarget, Reference,
    ResourceNode,
};

/// Why a reference was left unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No node in the graph carries the target address.
    UnknownTarget,
    /// More than one node carries the target address.
    Ambiguous,
    /// Following the reference chain revisits a node.
    Cycle,
}

/// A reference that resolution could not bind. Retained so consumers can
/// flag it; it is never silently dropped from the graph.
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedRef {
    pub reference: NodeId,
    pub target: String,
    pub reason: UnresolvedReason,
}

/// A reference chased down to a concrete value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue<'a> {
    Scalar(&'a crate::node::Scalar),
    List(&'a [PropertyValue]),
    Map(&'a BTreeMap<String, PropertyValue>),
    Literal(&'a str),
}

/// The resource graph for one compilation run. Immutable once built;
/// safe to share read-only across synthesis workers.
#[derive(Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    unresolved: Vec<UnresolvedRef>,
}

impl Graph {
    /// Look up any node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Resources in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Resource(r) => Some(r),
            _ => None,
        })
    }

    /// Outputs in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Output(o) => Some(o),
            _ => None,
        })
    }

    /// References, resolved or not.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Reference(r) => Some(r),
            _ => None,
        })
    }

    /// References that resolution could not bind.
    pub fn unresolved(&self) -> &[UnresolvedRef] {
        &self.unresolved
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Follow a reference chain to the concrete value it names.
    ///
    /// Returns `None` when the chain passes through an unresolved
    /// reference, a missing attribute, or a cycle: the value is unknown,
    /// which is not an error.
    pub fn chase(&self, start: NodeId) -> Option<ResolvedValue<'_>> {
        let mut visited = HashSet::new();
        let mut current = start;
        loop {
            if !visited.insert(current) {
                return None;
            }
            match self.node(current)? {
                Node::Reference(reference) => {
                    let target = match &reference.target {
                        RefTarget::Node(id) => *id,
                        RefTarget::Named(_) => return None,
                    };
                    match self.node(target)? {
                        Node::Resource(resource) => {
                            if reference.property.is_empty() {
                                return Some(ResolvedValue::Map(&resource.properties));
                            }
                            match navigate(&resource.properties, &reference.property)? {
                                PropertyValue::Ref(next) => current = *next,
                                PropertyValue::Scalar(s) => return Some(ResolvedValue::Scalar(s)),
                                PropertyValue::List(l) => return Some(ResolvedValue::List(l)),
                                PropertyValue::Map(m) => return Some(ResolvedValue::Map(m)),
                            }
                        }
                        Node::Output(output) => match &output.value {
                            OutputValue::Literal(s) => return Some(ResolvedValue::Literal(s)),
                            OutputValue::Ref(next) => current = *next,
                        },
                        Node::Reference(_) => current = target,
                    }
                }
                Node::Output(output) => match &output.value {
                    OutputValue::Literal(s) => return Some(ResolvedValue::Literal(s)),
                    OutputValue::Ref(next) => current = *next,
                },
                Node::Resource(resource) => return Some(ResolvedValue::Map(&resource.properties)),
            }
        }
    }
}

/// Navigate a non-empty attribute path into a resource's properties.
fn navigate<'a>(
    properties: &'a BTreeMap<String, PropertyValue>,
    path: &[Attribute],
) -> Option<&'a PropertyValue> {
    let (first, rest) = path.split_first()?;
    let mut value = match first {
        Attribute::Key(key) => properties.get(key)?,
        Attribute::Index(_) => return None,
    };
    for segment in rest {
        value = match (value, segment) {
            (PropertyValue::Map(map), Attribute::Key(key)) => map.get(key)?,
            (PropertyValue::List(list), Attribute::Index(i)) => list.get(*i)?,
            _ => return None,
        };
    }
    Some(value)
}

/// Accumulates nodes for one compilation run and resolves references at
/// `finish()`. The only way to construct a [`Graph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource node, returning its id.
    pub fn resource(
        &mut self,
        name: impl Into<String>,
        r#type: impl Into<String>,
        properties: BTreeMap<String, PropertyValue>,
    ) -> NodeId {
        let id = NodeId::next();
        self.nodes.push(Node::Resource(ResourceNode {
            id,
            name: name.into(),
            r#type: r#type.into(),
            properties,
        }));
        id
    }

    /// Add an output node, returning its id.
    pub fn output(
        &mut self,
        name: impl Into<String>,
        r#type: impl Into<String>,
        value: OutputValue,
    ) -> NodeId {
        let id = NodeId::next();
        self.nodes.push(Node::Output(Output {
            id,
            name: name.into(),
            r#type: r#type.into(),
            value,
        }));
        id
    }

    /// Add a reference node pointing at a named address, returning its id.
    pub fn reference(&mut self, target: impl Into<String>, property: Vec<Attribute>) -> NodeId {
        let id = NodeId::next();
        self.nodes.push(Node::Reference(Reference {
            id,
            target: RefTarget::Named(target.into()),
            property,
        }));
        id
    }

    /// Resolve references and freeze the graph.
    ///
    /// Resolution is a worklist over the named references, independent of
    /// declaration order: each address must bind to exactly one node in
    /// this graph or the reference stays unresolved. Chains that revisit
    /// a node are reported as [`UnresolvedReason::Cycle`] instead of
    /// being recursed into.
    pub fn finish(mut self) -> Graph {
        let mut addresses: HashMap<String, Vec<NodeId>> = HashMap::new();
        for node in &self.nodes {
            match node {
                Node::Resource(r) => {
                    addresses.entry(r.address()).or_default().push(r.id);
                }
                Node::Output(o) => {
                    addresses.entry(o.name.clone()).or_default().push(o.id);
                    addresses
                        .entry(format!("output.{}", o.name))
                        .or_default()
                        .push(o.id);
                }
                Node::Reference(_) => {}
            }
        }

        let mut unresolved = Vec::new();
        let mut bindings: HashMap<NodeId, NodeId> = HashMap::new();
        for node in &self.nodes {
            let Node::Reference(reference) = node else {
                continue;
            };
            let RefTarget::Named(target) = &reference.target else {
                continue;
            };
            match addresses.get(target).map(Vec::as_slice) {
                Some([single]) => {
                    bindings.insert(reference.id, *single);
                }
                Some(_) => unresolved.push(UnresolvedRef {
                    reference: reference.id,
                    target: target.clone(),
                    reason: UnresolvedReason::Ambiguous,
                }),
                None => unresolved.push(UnresolvedRef {
                    reference: reference.id,
                    target: target.clone(),
                    reason: UnresolvedReason::UnknownTarget,
                }),
            }
        }

        // Bindings that close a cycle are backed out before they are
        // applied, so the cycle is reported rather than followed.
        let by_id: HashMap<NodeId, &Node> = self.nodes.iter().map(|n| (n.id(), n)).collect();
        let cyclic: Vec<NodeId> = bindings
            .keys()
            .copied()
            .filter(|&id| chain_has_cycle(&by_id, &bindings, id))
            .collect();
        drop(by_id);
        for id in cyclic {
            bindings.remove(&id);
            let target = named_target(&self.nodes, id).unwrap_or_default();
            unresolved.push(UnresolvedRef {
                reference: id,
                target,
                reason: UnresolvedReason::Cycle,
            });
        }

        for node in &mut self.nodes {
            let Node::Reference(reference) = node else {
                continue;
            };
            if let Some(target) = bindings.get(&reference.id) {
                reference.target = RefTarget::Node(*target);
            }
        }

        if !unresolved.is_empty() {
            debug!(
                count = unresolved.len(),
                "graph finished with unresolved references"
            );
        }

        let index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id(), i))
            .collect();
        Graph {
            nodes: self.nodes,
            index,
            unresolved,
        }
    }
}

fn named_target(nodes: &[Node], id: NodeId) -> Option<String> {
    nodes.iter().find_map(|n| match n {
        Node::Reference(r) if r.id == id => match &r.target {
            RefTarget::Named(s) => Some(s.clone()),
            RefTarget::Node(_) => None,
        },
        _ => None,
    })
}

/// Walk the chain a reference would be chased through, using tentative
/// bindings, and report whether it revisits a node.
fn chain_has_cycle(
    by_id: &HashMap<NodeId, &Node>,
    bindings: &HashMap<NodeId, NodeId>,
    start: NodeId,
) -> bool {
    let mut visited = HashSet::new();
    let mut current = start;
    loop {
        if !visited.insert(current) {
            return true;
        }
        let Some(node) = by_id.get(&current) else {
            return false;
        };
        let next = match node {
            Node::Reference(reference) => {
                let target = match &reference.target {
                    RefTarget::Node(id) => Some(*id),
                    RefTarget::Named(_) => bindings.get(&reference.id).copied(),
                };
                let Some(target) = target else { return false };
                match by_id.get(&target) {
                    Some(Node::Resource(resource)) => {
                        match navigate(&resource.properties, &reference.property) {
                            Some(PropertyValue::Ref(next)) => Some(*next),
                            _ => None,
                        }
                    }
                    Some(Node::Output(output)) => match &output.value {
                        OutputValue::Ref(next) => Some(*next),
                        OutputValue::Literal(_) => None,
                    },
                    Some(Node::Reference(_)) => Some(target),
                    None => None,
                }
            }
            Node::Output(output) => match &output.value {
                OutputValue::Ref(next) => Some(*next),
                OutputValue::Literal(_) => None,
            },
            Node::Resource(_) => None,
        };
        match next {
            Some(next) => current = next,
            None => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Scalar;

    fn props(entries: &[(&str, PropertyValue)]) -> BTreeMap<String, PropertyValue> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_resolution_is_order_independent() {
        // The reference is declared before its target.
        let mut builder = GraphBuilder::new();
        let r = builder.reference("aws_s3_bucket.logs", vec![Attribute::key("bucket")]);
        builder.resource(
            "logs",
            "aws_s3_bucket",
            props(&[(
                "bucket",
                PropertyValue::Scalar(Scalar::from("audit-logs")),
            )]),
        );

        let graph = builder.finish();
        assert!(graph.unresolved().is_empty());
        assert_eq!(
            graph.chase(r),
            Some(ResolvedValue::Scalar(&Scalar::from("audit-logs")))
        );
    }

    #[test]
    fn test_unknown_target_is_retained() {
        let mut builder = GraphBuilder::new();
        let r = builder.reference("aws_s3_bucket.missing", vec![Attribute::key("id")]);
        let graph = builder.finish();

        assert_eq!(graph.unresolved().len(), 1);
        assert_eq!(graph.unresolved()[0].reason, UnresolvedReason::UnknownTarget);
        // The reference node itself survives with its named target.
        match graph.node(r) {
            Some(Node::Reference(reference)) => {
                assert_eq!(
                    reference.target,
                    RefTarget::Named("aws_s3_bucket.missing".to_string())
                );
            }
            other => panic!("expected reference node, got {other:?}"),
        }
        assert_eq!(graph.chase(r), None);
    }

    #[test]
    fn test_ambiguous_target_is_unresolved() {
        let mut builder = GraphBuilder::new();
        builder.resource("dup", "aws_s3_bucket", BTreeMap::new());
        builder.resource("dup", "aws_s3_bucket", BTreeMap::new());
        builder.reference("aws_s3_bucket.dup", vec![]);

        let graph = builder.finish();
        assert_eq!(graph.unresolved().len(), 1);
        assert_eq!(graph.unresolved()[0].reason, UnresolvedReason::Ambiguous);
    }

    #[test]
    fn test_cycle_is_reported_not_followed() {
        // a.link -> b.link -> a.link
        let mut builder = GraphBuilder::new();
        let ra = builder.reference("aws_instance.b", vec![Attribute::key("link")]);
        let rb = builder.reference("aws_instance.a", vec![Attribute::key("link")]);
        builder.resource(
            "a",
            "aws_instance",
            props(&[("link", PropertyValue::Ref(ra))]),
        );
        builder.resource(
            "b",
            "aws_instance",
            props(&[("link", PropertyValue::Ref(rb))]),
        );

        let graph = builder.finish();
        assert_eq!(graph.unresolved().len(), 2);
        assert!(graph
            .unresolved()
            .iter()
            .all(|u| u.reason == UnresolvedReason::Cycle));
        assert_eq!(graph.chase(ra), None);
        assert_eq!(graph.chase(rb), None);
    }

    #[test]
    fn test_chase_through_output() {
        let mut builder = GraphBuilder::new();
        let r = builder.reference("output.bucket_name", vec![]);
        builder.output(
            "bucket_name",
            "string",
            OutputValue::Literal("audit-logs".to_string()),
        );

        let graph = builder.finish();
        assert!(graph.unresolved().is_empty());
        assert_eq!(graph.chase(r), Some(ResolvedValue::Literal("audit-logs")));
    }

    #[test]
    fn test_chase_nested_path() {
        let mut builder = GraphBuilder::new();
        let r = builder.reference(
            "aws_instance.web",
            vec![
                Attribute::key("tags"),
                Attribute::key("team"),
            ],
        );
        builder.resource(
            "web",
            "aws_instance",
            props(&[(
                "tags",
                PropertyValue::Map(
                    [(
                        "team".to_string(),
                        PropertyValue::Scalar(Scalar::from("platform")),
                    )]
                    .into_iter()
                    .collect(),
                ),
            )]),
        );

        let graph = builder.finish();
        assert_eq!(
            graph.chase(r),
            Some(ResolvedValue::Scalar(&Scalar::from("platform")))
        );
    }

    #[test]
    fn test_missing_attribute_is_unknown_not_error() {
        let mut builder = GraphBuilder::new();
        let r = builder.reference("aws_instance.web", vec![Attribute::key("absent")]);
        builder.resource("web", "aws_instance", BTreeMap::new());

        let graph = builder.finish();
        // The target binds; the value is simply unknown.
        assert!(graph.unresolved().is_empty());
        assert_eq!(graph.chase(r), None);
    }

    #[test]
    fn test_references_never_cross_compilation_runs() {
        // Two graphs declare the same address with different values; each
        // reference must bind within its own graph.
        let build = |value: &str| {
            let mut builder = GraphBuilder::new();
            let r = builder.reference("aws_s3_bucket.logs", vec![Attribute::key("bucket")]);
            builder.resource(
                "logs",
                "aws_s3_bucket",
                props(&[("bucket", PropertyValue::Scalar(Scalar::from(value)))]),
            );
            (builder.finish(), r)
        };

        let (first, first_ref) = build("first");
        let (second, second_ref) = build("second");

        assert_eq!(
            first.chase(first_ref),
            Some(ResolvedValue::Scalar(&Scalar::from("first")))
        );
        assert_eq!(
            second.chase(second_ref),
            Some(ResolvedValue::Scalar(&Scalar::from("second")))
        );
        // A node id from one run does not exist in the other.
        assert!(second.node(first_ref).is_none());
    }

    #[test]
    fn test_resources_keep_declaration_order() {
        let mut builder = GraphBuilder::new();
        builder.resource("b", "aws_s3_bucket", BTreeMap::new());
        builder.resource("a", "aws_instance", BTreeMap::new());

        let graph = builder.finish();
        let names: Vec<_> = graph.resources().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
