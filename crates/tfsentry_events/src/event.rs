//! The synthetic event record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EventsResult;

/// One synthetic runtime event, shaped like a CloudTrail management
/// record. Self-contained: it serializes without the graph that produced
/// it, which is discarded after synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticEvent {
    pub event_version: String,
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub event_time: DateTime<Utc>,
    pub event_source: String,
    pub event_name: String,
    pub aws_region: String,
    pub read_only: bool,
    pub request_parameters: serde_json::Value,
}

impl SyntheticEvent {
    /// Serialize to the JSON document the evaluator consumes.
    pub fn to_json(&self) -> EventsResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_cloudtrail_keys() {
        let event = SyntheticEvent {
            event_version: "1.08".to_string(),
            event_id: "e-1".to_string(),
            event_time: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            event_source: "s3.amazonaws.com".to_string(),
            event_name: "CreateBucket".to_string(),
            aws_region: "us-east-1".to_string(),
            read_only: false,
            request_parameters: serde_json::json!({"bucketName": "logs"}),
        };

        let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["eventSource"], "s3.amazonaws.com");
        assert_eq!(json["eventName"], "CreateBucket");
        assert_eq!(json["eventID"], "e-1");
        assert_eq!(json["requestParameters"]["bucketName"], "logs");
        assert_eq!(json["readOnly"], false);
    }

    #[test]
    fn test_event_round_trips() {
        let event = SyntheticEvent {
            event_version: "1.08".to_string(),
            event_id: "e-2".to_string(),
            event_time: Utc::now(),
            event_source: "iam.amazonaws.com".to_string(),
            event_name: "CreateRole".to_string(),
            aws_region: "eu-west-1".to_string(),
            read_only: false,
            request_parameters: serde_json::Value::Null,
        };

        let parsed: SyntheticEvent = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(parsed.event_name, event.event_name);
        assert_eq!(parsed.event_id, event.event_id);
    }
}
