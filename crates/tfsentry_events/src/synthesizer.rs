//! Synthesizer trait and registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use tfsentry_ir::Graph;

use crate::cloudtrail::CloudTrailSynthesizer;
use crate::error::{EventsError, EventsResult};
use crate::event::SyntheticEvent;

/// Target event formats the registry knows how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFormat {
    CloudTrail,
}

impl EventFormat {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CloudTrail => "cloudtrail",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "cloudtrail" => Some(Self::CloudTrail),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Maps a resolved graph into an ordered event sequence for one target
/// format. Ordering follows the graph's declaration order, which in turn
/// follows discovery order.
pub trait Synthesizer: Send + Sync {
    fn format(&self) -> EventFormat;

    fn synthesize(&self, graph: &Graph) -> EventsResult<Vec<SyntheticEvent>>;
}

/// Registry of synthesizers, keyed by target format.
#[derive(Default)]
pub struct SynthesizerRegistry {
    synthesizers: HashMap<EventFormat, Arc<dyn Synthesizer>>,
}

impl SynthesizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in synthesizers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CloudTrailSynthesizer::new()));
        registry
    }

    pub fn register(&mut self, synthesizer: Arc<dyn Synthesizer>) {
        debug!("registering synthesizer: {}", synthesizer.format());
        self.synthesizers
            .insert(synthesizer.format(), synthesizer);
    }

    /// Synthesize events in the given format.
    pub fn synthesize(
        &self,
        format: EventFormat,
        graph: &Graph,
    ) -> EventsResult<Vec<SyntheticEvent>> {
        let synthesizer = self
            .synthesizers
            .get(&format)
            .ok_or_else(|| EventsError::UnsupportedFormat(format.tag().to_string()))?;
        let events = synthesizer.synthesize(graph)?;
        info!(format = %format, events = events.len(), "synthesized events");
        Ok(events)
    }
}

impl std::fmt::Debug for SynthesizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesizerRegistry")
            .field("formats", &self.synthesizers.keys().collect::<Vec<_>>())
            .finish()
    }
}
