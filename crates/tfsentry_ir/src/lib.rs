//! # tfsentry_ir
//!
//! The canonical intermediate representation shared by every tfsentry
//! front end and event synthesizer.
//!
//! A front end compiles parsed source into a [`Graph`] of resources,
//! outputs, and references. The graph is built through a [`GraphBuilder`],
//! resolved once at `finish()`, and immutable afterwards; downstream
//! stages only read it and discard it after synthesizing events.
//!
//! ## Example
//!
//! ```rust
//! use tfsentry_ir::{Attribute, GraphBuilder, PropertyValue, Scalar};
//!
//! let mut builder = GraphBuilder::new();
//! let reference = builder.reference("aws_s3_bucket.logs", vec![Attribute::key("bucket")]);
//!
//! let mut props = std::collections::BTreeMap::new();
//! props.insert("bucket".to_string(), PropertyValue::Scalar(Scalar::from("logs")));
//! builder.resource("logs", "aws_s3_bucket", props);
//!
//! let graph = builder.finish();
//! assert!(graph.unresolved().is_empty());
//! assert!(graph.chase(reference).is_some());
//! ```

pub mod graph;
pub mod node;

pub use graph::{Graph, GraphBuilder, ResolvedValue, UnresolvedRef, UnresolvedReason};
pub use node::{
    Attribute, Node, NodeId, Output, OutputValue, PropertyValue, RefTarget, Reference,
    ResourceNode, Scalar,
};
