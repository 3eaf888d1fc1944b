//! CloudTrail back end.
//!
//! Every declared AWS resource maps to the management-plane event its
//! creation would record: `aws_s3_bucket` to `s3:CreateBucket`,
//! `aws_iam_role` to `iam:CreateRole`, and so on. Types without a table
//! entry derive a `Create…` name from the resource type; types outside
//! the `aws_` namespace synthesize nothing.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use tfsentry_ir::{Graph, PropertyValue, ResolvedValue, ResourceNode, Scalar};

use crate::error::EventsResult;
use crate::event::SyntheticEvent;
use crate::synthesizer::{EventFormat, Synthesizer};

const EVENT_VERSION: &str = "1.08";
const DEFAULT_REGION: &str = "us-east-1";

/// Known resource types: (terraform type, event source service, event name).
const EVENT_TABLE: &[(&str, &str, &str)] = &[
    ("aws_s3_bucket", "s3", "CreateBucket"),
    ("aws_s3_bucket_policy", "s3", "PutBucketPolicy"),
    ("aws_instance", "ec2", "RunInstances"),
    ("aws_security_group", "ec2", "CreateSecurityGroup"),
    ("aws_vpc", "ec2", "CreateVpc"),
    ("aws_subnet", "ec2", "CreateSubnet"),
    ("aws_iam_role", "iam", "CreateRole"),
    ("aws_iam_user", "iam", "CreateUser"),
    ("aws_iam_policy", "iam", "CreatePolicy"),
    ("aws_db_instance", "rds", "CreateDBInstance"),
    ("aws_lambda_function", "lambda", "CreateFunction"),
    ("aws_sqs_queue", "sqs", "CreateQueue"),
    ("aws_sns_topic", "sns", "CreateTopic"),
    ("aws_dynamodb_table", "dynamodb", "CreateTable"),
    ("aws_kms_key", "kms", "CreateKey"),
    ("aws_cloudtrail", "cloudtrail", "CreateTrail"),
];

/// Synthesizes CloudTrail management events from a resource graph.
#[derive(Debug, Clone, Default)]
pub struct CloudTrailSynthesizer {
    region: Option<String>,
    fixed_time: Option<DateTime<Utc>>,
}

impl CloudTrailSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Region stamped into every event.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Pin event timestamps, for deterministic output.
    pub fn with_fixed_time(mut self, time: DateTime<Utc>) -> Self {
        self.fixed_time = Some(time);
        self
    }

    fn event_for(&self, graph: &Graph, resource: &ResourceNode) -> Option<SyntheticEvent> {
        let (service, event_name) = classify(&resource.r#type)?;
        Some(SyntheticEvent {
            event_version: EVENT_VERSION.to_string(),
            event_id: Uuid::new_v4().to_string(),
            event_time: self.fixed_time.unwrap_or_else(Utc::now),
            event_source: format!("{service}.amazonaws.com"),
            event_name,
            aws_region: self
                .region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            read_only: false,
            request_parameters: parameters(graph, resource),
        })
    }
}

impl Synthesizer for CloudTrailSynthesizer {
    fn format(&self) -> EventFormat {
        EventFormat::CloudTrail
    }

    fn synthesize(&self, graph: &Graph) -> EventsResult<Vec<SyntheticEvent>> {
        let mut events = Vec::new();
        for resource in graph.resources() {
            match self.event_for(graph, resource) {
                Some(event) => events.push(event),
                None => debug!(
                    resource_type = %resource.r#type,
                    "no event mapping for resource type"
                ),
            }
        }
        Ok(events)
    }
}

/// Service and event name for a resource type. Falls back to a derived
/// `Create…` name for unknown `aws_*` types.
fn classify(resource_type: &str) -> Option<(String, String)> {
    if let Some((_, service, name)) = EVENT_TABLE
        .iter()
        .find(|(t, _, _)| *t == resource_type)
    {
        return Some((service.to_string(), name.to_string()));
    }

    let rest = resource_type.strip_prefix("aws_")?;
    let mut segments = rest.split('_');
    let service = segments.next()?.to_string();
    let suffix: String = segments
        .map(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if suffix.is_empty() {
        return None;
    }
    Some((service, format!("Create{suffix}")))
}

/// Materialize the declared properties as request parameters, chasing
/// references through the graph. An unresolved reference is an unknown
/// value and becomes JSON null.
fn parameters(graph: &Graph, resource: &ResourceNode) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = resource
        .properties
        .iter()
        .map(|(key, value)| (key.clone(), value_to_json(graph, value)))
        .collect();
    serde_json::Value::Object(map)
}

fn value_to_json(graph: &Graph, value: &PropertyValue) -> serde_json::Value {
    match value {
        PropertyValue::Scalar(scalar) => scalar_to_json(scalar),
        PropertyValue::Ref(id) => match graph.chase(*id) {
            Some(ResolvedValue::Scalar(scalar)) => scalar_to_json(scalar),
            Some(ResolvedValue::Literal(literal)) => serde_json::Value::String(literal.to_string()),
            Some(ResolvedValue::List(items)) => items
                .iter()
                .map(|item| value_to_json(graph, item))
                .collect(),
            Some(ResolvedValue::Map(map)) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), value_to_json(graph, v)))
                    .collect(),
            ),
            None => serde_json::Value::Null,
        },
        PropertyValue::List(items) => items
            .iter()
            .map(|item| value_to_json(graph, item))
            .collect(),
        PropertyValue::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(graph, v)))
                .collect(),
        ),
    }
}

fn scalar_to_json(scalar: &Scalar) -> serde_json::Value {
    match scalar {
        Scalar::String(s) => serde_json::Value::String(s.clone()),
        Scalar::Bool(b) => serde_json::Value::Bool(*b),
        Scalar::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tfsentry_ir::{Attribute, GraphBuilder};

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_one_resource_one_event() {
        let mut builder = GraphBuilder::new();
        let mut props = BTreeMap::new();
        props.insert(
            "bucket".to_string(),
            PropertyValue::Scalar(Scalar::from("audit-logs")),
        );
        builder.resource("logs", "aws_s3_bucket", props);
        let graph = builder.finish();

        let events = CloudTrailSynthesizer::new()
            .with_fixed_time(fixed_time())
            .synthesize(&graph)
            .unwrap();

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.event_source, "s3.amazonaws.com");
        assert_eq!(event.event_name, "CreateBucket");
        assert_eq!(event.request_parameters["bucket"], "audit-logs");
        assert_eq!(event.event_time, fixed_time());
    }

    #[test]
    fn test_events_follow_declaration_order() {
        let mut builder = GraphBuilder::new();
        builder.resource("zeta", "aws_sqs_queue", BTreeMap::new());
        builder.resource("alpha", "aws_sns_topic", BTreeMap::new());
        let graph = builder.finish();

        let events = CloudTrailSynthesizer::new().synthesize(&graph).unwrap();
        let names: Vec<_> = events.iter().map(|e| e.event_name.as_str()).collect();
        assert_eq!(names, vec!["CreateQueue", "CreateTopic"]);
    }

    #[test]
    fn test_unknown_aws_type_derives_event_name() {
        let mut builder = GraphBuilder::new();
        builder.resource("etl", "aws_glue_job", BTreeMap::new());
        let graph = builder.finish();

        let events = CloudTrailSynthesizer::new().synthesize(&graph).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_source, "glue.amazonaws.com");
        assert_eq!(events[0].event_name, "CreateJob");
    }

    #[test]
    fn test_non_aws_type_synthesizes_nothing() {
        let mut builder = GraphBuilder::new();
        builder.resource("repo", "github_repository", BTreeMap::new());
        let graph = builder.finish();

        let events = CloudTrailSynthesizer::new().synthesize(&graph).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_resolved_reference_becomes_parameter_value() {
        let mut builder = GraphBuilder::new();
        let reference = builder.reference("aws_subnet.main", vec![Attribute::key("cidr")]);
        let mut instance_props = BTreeMap::new();
        instance_props.insert("subnet".to_string(), PropertyValue::Ref(reference));
        builder.resource("web", "aws_instance", instance_props);

        let mut subnet_props = BTreeMap::new();
        subnet_props.insert(
            "cidr".to_string(),
            PropertyValue::Scalar(Scalar::from("10.0.0.0/24")),
        );
        builder.resource("main", "aws_subnet", subnet_props);
        let graph = builder.finish();

        let events = CloudTrailSynthesizer::new().synthesize(&graph).unwrap();
        let run_instances = events
            .iter()
            .find(|e| e.event_name == "RunInstances")
            .unwrap();
        assert_eq!(run_instances.request_parameters["subnet"], "10.0.0.0/24");
    }

    #[test]
    fn test_unresolved_reference_is_null_parameter() {
        let mut builder = GraphBuilder::new();
        let reference = builder.reference("var.vpc_id", Vec::new());
        let mut props = BTreeMap::new();
        props.insert("vpc".to_string(), PropertyValue::Ref(reference));
        builder.resource("web", "aws_instance", props);
        let graph = builder.finish();

        let events = CloudTrailSynthesizer::new().synthesize(&graph).unwrap();
        assert_eq!(
            events[0].request_parameters["vpc"],
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_events_are_self_contained() {
        let json = {
            let mut builder = GraphBuilder::new();
            builder.resource("key", "aws_kms_key", BTreeMap::new());
            let graph = builder.finish();
            let events = CloudTrailSynthesizer::new().synthesize(&graph).unwrap();
            events[0].to_json().unwrap()
            // graph dropped here
        };
        let parsed: SyntheticEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_name, "CreateKey");
    }
}
