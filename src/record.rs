//! Event records and tolerant line extraction
//!
//! The app and router tiers log different JSON shapes with no discriminant
//! tag, and producers add fields over time. An `EventRecord` is therefore a
//! plain string-keyed JSON map with typed accessors for the handful of
//! fields the summaries read.
//!
//! Lines may carry a `[pod/<name>[/<container>]]` prefix (added by
//! `kubectl logs --prefix`). Extraction strips it, parses the first JSON
//! object on the line, and records the pod/container under `_pod` and
//! `_container` unless the payload already has those keys.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Endpoint name used for records that do not carry one
pub const UNKNOWN_ENDPOINT: &str = "unknown";

pub const POD_FIELD: &str = "_pod";
pub const CONTAINER_FIELD: &str = "_container";

/// One logged event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord(Map<String, Value>);

impl EventRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a record from a `serde_json::Value`; non-objects yield `None`
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set `key` only if it is not already present
    pub fn set_default(&mut self, key: &str, value: impl Into<Value>) {
        self.0.entry(key).or_insert_with(|| value.into());
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Aggregation key; records without a string `endpoint` go to `"unknown"`
    pub fn endpoint(&self) -> &str {
        self.get("endpoint")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ENDPOINT)
    }

    /// Request latency. Anything other than a JSON number counts as absent,
    /// which marks the record as an error.
    pub fn latency_ms(&self) -> Option<f64> {
        self.get("latency_ms")
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }

    pub fn cache_hit(&self) -> bool {
        matches!(self.get("cache_hit"), Some(Value::Bool(true)))
    }

    pub fn diverted(&self) -> bool {
        matches!(self.get("diverted"), Some(Value::Bool(true)))
    }

    /// Shard the router picked; empty names are treated as missing
    pub fn selected_shard(&self) -> Option<&str> {
        self.get("selected_shard")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Router load proxy `L`, accepted as a number or a numeric string
    pub fn load_proxy(&self) -> Option<f64> {
        let value = match self.get("L")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn pod(&self) -> Option<&str> {
        self.get(POD_FIELD).and_then(Value::as_str)
    }

    pub fn container(&self) -> Option<&str> {
        self.get(CONTAINER_FIELD).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for EventRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Pod/container annotation stripped from the front of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodAnnotation<'a> {
    pub pod: &'a str,
    pub container: Option<&'a str>,
}

fn pod_prefix() -> &'static Regex {
    static POD_PREFIX: OnceLock<Regex> = OnceLock::new();
    POD_PREFIX.get_or_init(|| {
        Regex::new(r"^\[pod/([^/\]]+)(?:/([^\]]+))?\]\s*").expect("pod prefix pattern is valid")
    })
}

/// Split an optional `[pod/<name>[/<container>]]` prefix off `line`
pub fn split_annotation(line: &str) -> (Option<PodAnnotation<'_>>, &str) {
    let Some(caps) = pod_prefix().captures(line) else {
        return (None, line);
    };
    let Some(whole) = caps.get(0) else {
        return (None, line);
    };
    let annotation = caps.get(1).map(|pod| PodAnnotation {
        pod: pod.as_str(),
        container: caps.get(2).map(|c| c.as_str()),
    });
    (annotation, &line[whole.end()..])
}

/// Extract an event record from one trimmed log line
///
/// Returns `None` for blank lines, lines without a `{`, and lines whose JSON
/// does not parse. Parsing is strict: trailing data after the object (such
/// as a second concatenated object) rejects the line.
pub fn extract_record(line: &str) -> Option<EventRecord> {
    if line.is_empty() {
        return None;
    }

    let (annotation, rest) = split_annotation(line);
    let start = rest.find('{')?;
    let json = rest[start..].trim();

    let value: Value = serde_json::from_str(json).ok()?;
    let mut record = EventRecord::from_value(value)?;

    if let Some(annotation) = annotation {
        record.set_default(POD_FIELD, annotation.pod);
        if let Some(container) = annotation.container {
            record.set_default(CONTAINER_FIELD, container);
        }
    }

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> EventRecord {
        EventRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_bare_json() {
        let rec = extract_record(r#"{"endpoint":"auth","latency_ms":12}"#).unwrap();
        assert_eq!(rec.endpoint(), "auth");
        assert_eq!(rec.latency_ms(), Some(12.0));
        assert!(rec.pod().is_none());
    }

    #[test]
    fn test_extract_with_pod_and_container() {
        let rec = extract_record(r#"[pod/web-1/nginx] {"endpoint":"auth","latency_ms":12}"#)
            .unwrap();
        assert_eq!(rec.endpoint(), "auth");
        assert_eq!(rec.latency_ms(), Some(12.0));
        assert_eq!(rec.pod(), Some("web-1"));
        assert_eq!(rec.container(), Some("nginx"));
    }

    #[test]
    fn test_extract_with_pod_only() {
        let rec = extract_record(r#"[pod/router-7] {"endpoint":"features"}"#).unwrap();
        assert_eq!(rec.pod(), Some("router-7"));
        assert!(!rec.contains(CONTAINER_FIELD));
    }

    #[test]
    fn test_annotation_never_overwrites_payload() {
        let rec = extract_record(r#"[pod/web-1/nginx] {"_pod":"real","endpoint":"auth"}"#)
            .unwrap();
        assert_eq!(rec.pod(), Some("real"));
        assert_eq!(rec.container(), Some("nginx"));
    }

    #[test]
    fn test_leading_noise_before_json() {
        let rec = extract_record(r#"2024-05-01T10:00:00Z stdout F {"endpoint":"document"}"#)
            .unwrap();
        assert_eq!(rec.endpoint(), "document");
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(extract_record("not json at all").is_none());
        assert!(extract_record("").is_none());
        assert!(extract_record("[pod/web-1/nginx]").is_none());
        assert!(extract_record("[pod/web-1/nginx]   ").is_none());
    }

    #[test]
    fn test_rejects_corrupt_json() {
        assert!(extract_record(r#"{"endpoint":"auth","latency_ms":"#).is_none());
        assert!(extract_record(r#"[pod/a] {"endpoint": auth}"#).is_none());
    }

    #[test]
    fn test_rejects_concatenated_objects() {
        assert!(extract_record(r#"{"a":1}{"b":2}"#).is_none());
    }

    #[test]
    fn test_malformed_annotation_is_left_in_place() {
        // No closing bracket: the prefix is not stripped, but the JSON is
        // still found at the first brace.
        let rec = extract_record(r#"[pod/web-1 {"endpoint":"auth"}"#).unwrap();
        assert_eq!(rec.endpoint(), "auth");
        assert!(rec.pod().is_none());
    }

    #[test]
    fn test_split_annotation() {
        let (ann, rest) = split_annotation("[pod/a/b]\t{}");
        assert_eq!(
            ann,
            Some(PodAnnotation {
                pod: "a",
                container: Some("b")
            })
        );
        assert_eq!(rest, "{}");

        let (ann, rest) = split_annotation("{}");
        assert!(ann.is_none());
        assert_eq!(rest, "{}");
    }

    #[test]
    fn test_endpoint_defaults_to_unknown() {
        assert_eq!(record(json!({"latency_ms": 5})).endpoint(), UNKNOWN_ENDPOINT);
        assert_eq!(record(json!({"endpoint": 42})).endpoint(), UNKNOWN_ENDPOINT);
    }

    #[test]
    fn test_latency_must_be_numeric() {
        assert_eq!(record(json!({"latency_ms": 7.5})).latency_ms(), Some(7.5));
        assert_eq!(record(json!({"latency_ms": null})).latency_ms(), None);
        assert_eq!(record(json!({"latency_ms": "12"})).latency_ms(), None);
    }

    #[test]
    fn test_boolean_flags_require_true() {
        assert!(record(json!({"cache_hit": true})).cache_hit());
        assert!(!record(json!({"cache_hit": 1})).cache_hit());
        assert!(!record(json!({"cache_hit": "true"})).cache_hit());
        assert!(record(json!({"diverted": true})).diverted());
        assert!(!record(json!({"diverted": false})).diverted());
        assert!(!record(json!({})).diverted());
    }

    #[test]
    fn test_load_proxy_accepts_numeric_strings() {
        assert_eq!(record(json!({"L": 0.75})).load_proxy(), Some(0.75));
        assert_eq!(record(json!({"L": "1.5"})).load_proxy(), Some(1.5));
        assert_eq!(record(json!({"L": "high"})).load_proxy(), None);
        assert_eq!(record(json!({"L": "nan"})).load_proxy(), None);
        assert_eq!(record(json!({"L": true})).load_proxy(), None);
    }

    #[test]
    fn test_selected_shard_ignores_empty() {
        assert_eq!(
            record(json!({"selected_shard": "s1"})).selected_shard(),
            Some("s1")
        );
        assert_eq!(record(json!({"selected_shard": ""})).selected_shard(), None);
    }
}
