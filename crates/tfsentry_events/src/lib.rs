//! # tfsentry_events
//!
//! Synthetic security events: "what this infrastructure would cause to
//! happen" at runtime.
//!
//! A [`Synthesizer`] consumes a resolved [`tfsentry_ir::Graph`] and
//! produces an ordered sequence of [`SyntheticEvent`]s in a target
//! format. Events are self-contained documents; the graph is discarded
//! once synthesis is done. [`CloudTrailSynthesizer`] is the built-in
//! back end, mapping each declared AWS resource to the management-plane
//! event its creation would record.
//!
//! ## Example
//!
//! ```rust
//! use tfsentry_ir::GraphBuilder;
//! use tfsentry_events::{CloudTrailSynthesizer, Synthesizer};
//!
//! let mut builder = GraphBuilder::new();
//! builder.resource("logs", "aws_s3_bucket", Default::default());
//! let graph = builder.finish();
//!
//! let events = CloudTrailSynthesizer::new().synthesize(&graph).unwrap();
//! assert_eq!(events[0].event_name, "CreateBucket");
//! ```

pub mod cloudtrail;
pub mod error;
pub mod event;
pub mod synthesizer;

pub use cloudtrail::CloudTrailSynthesizer;
pub use error::{EventsError, EventsResult};
pub use event::SyntheticEvent;
pub use synthesizer::{EventFormat, Synthesizer, SynthesizerRegistry};
