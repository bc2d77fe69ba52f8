//! Notification model and header derivation
//!
//! A [`Notification`] is split across the wire: the device token goes into
//! the URL path, delivery metadata goes into `apns-*` request headers, and
//! only the payload is serialized into the body.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::payload::Payload;

pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_APNS_TOPIC: &str = "apns-topic";
pub const HEADER_APNS_ID: &str = "apns-id";
pub const HEADER_APNS_COLLAPSE_ID: &str = "apns-collapse-id";
pub const HEADER_APNS_PRIORITY: &str = "apns-priority";
pub const HEADER_APNS_EXPIRATION: &str = "apns-expiration";

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Send immediately.
pub const PRIORITY_HIGH: u8 = 10;
/// Send at a time that conserves power on the device.
pub const PRIORITY_LOW: u8 = 5;

/// One push to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification<P = Payload> {
    /// Destination device; travels in the URL path.
    pub device_token: String,
    /// Target app bundle id.
    pub topic: Option<String>,
    /// Caller-assigned id; the gateway generates one when absent.
    pub apns_id: Option<String>,
    pub collapse_id: Option<String>,
    /// `None` or `Some(0)` leaves the choice to the gateway.
    pub priority: Option<u8>,
    /// `None` or the Unix epoch leaves the choice to the gateway.
    pub expiration: Option<DateTime<Utc>>,
    pub payload: P,
}

impl<P> Notification<P> {
    pub fn new(device_token: impl Into<String>, payload: P) -> Self {
        Self {
            device_token: device_token.into(),
            topic: None,
            apns_id: None,
            collapse_id: None,
            priority: None,
            expiration: None,
            payload,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_apns_id(mut self, apns_id: impl Into<String>) -> Self {
        self.apns_id = Some(apns_id.into());
        self
    }

    pub fn with_collapse_id(mut self, collapse_id: impl Into<String>) -> Self {
        self.collapse_id = Some(collapse_id.into());
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Short token prefix that is safe to put in logs.
    pub fn token_prefix(&self) -> String {
        self.device_token.chars().take(8).collect()
    }
}

impl<P: Serialize> Notification<P> {
    /// JSON body for the request: the payload and nothing else.
    pub fn encode_body(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.payload)
    }
}

/// Request headers for a notification, in a fixed order.
///
/// `content-type` is always first; each `apns-*` header is present only when
/// the corresponding field is non-empty or non-zero.
pub fn notification_headers<P>(notification: &Notification<P>) -> Vec<(&'static str, String)> {
    let mut headers = vec![(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON.to_string())];

    if let Some(topic) = non_empty(&notification.topic) {
        headers.push((HEADER_APNS_TOPIC, topic.to_string()));
    }
    if let Some(apns_id) = non_empty(&notification.apns_id) {
        headers.push((HEADER_APNS_ID, apns_id.to_string()));
    }
    if let Some(collapse_id) = non_empty(&notification.collapse_id) {
        headers.push((HEADER_APNS_COLLAPSE_ID, collapse_id.to_string()));
    }
    if let Some(priority) = notification.priority.filter(|p| *p > 0) {
        headers.push((HEADER_APNS_PRIORITY, priority.to_string()));
    }
    if let Some(expiration) = notification.expiration.filter(|e| e.timestamp() != 0) {
        headers.push((HEADER_APNS_EXPIRATION, expiration.timestamp().to_string()));
    }

    headers
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn header<'a>(headers: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_minimal_notification_only_sets_content_type() {
        let n = Notification::new("abc123", Payload::new().alert("hi"));
        let headers = notification_headers(&n);
        assert_eq!(
            headers,
            vec![(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON.to_string())]
        );
    }

    #[test]
    fn test_all_headers_in_order() {
        let n = Notification::new("abc123", Payload::new())
            .with_topic("com.example.app")
            .with_apns_id("123e4567-e89b-12d3-a456-426614174000")
            .with_collapse_id("score")
            .with_priority(PRIORITY_HIGH)
            .with_expiration(Utc.timestamp_opt(1_700_000_000, 0).unwrap());

        let names: Vec<&str> = notification_headers(&n).iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                HEADER_CONTENT_TYPE,
                HEADER_APNS_TOPIC,
                HEADER_APNS_ID,
                HEADER_APNS_COLLAPSE_ID,
                HEADER_APNS_PRIORITY,
                HEADER_APNS_EXPIRATION,
            ]
        );
    }

    #[test]
    fn test_priority_header_only_when_positive() {
        for priority in [None, Some(0)] {
            let mut n = Notification::new("t", Payload::new());
            n.priority = priority;
            assert_eq!(header(&notification_headers(&n), HEADER_APNS_PRIORITY), None);
        }

        for priority in [1u8, PRIORITY_LOW, PRIORITY_HIGH, u8::MAX] {
            let n = Notification::new("t", Payload::new()).with_priority(priority);
            let headers = notification_headers(&n);
            let expected = priority.to_string();
            assert_eq!(header(&headers, HEADER_APNS_PRIORITY), Some(expected.as_str()));
        }
    }

    #[test]
    fn test_expiration_header_in_epoch_seconds() {
        let n = Notification::new("t", Payload::new())
            .with_expiration(Utc.timestamp_opt(1_420_716_052, 999_000_000).unwrap());
        assert_eq!(
            header(&notification_headers(&n), HEADER_APNS_EXPIRATION),
            Some("1420716052")
        );
    }

    #[test]
    fn test_zero_expiration_is_omitted() {
        let n = Notification::new("t", Payload::new()).with_expiration(Utc.timestamp_opt(0, 0).unwrap());
        assert_eq!(header(&notification_headers(&n), HEADER_APNS_EXPIRATION), None);
    }

    #[test]
    fn test_empty_strings_are_omitted() {
        let n = Notification::new("t", Payload::new())
            .with_topic("")
            .with_apns_id("")
            .with_collapse_id("");
        assert_eq!(notification_headers(&n).len(), 1);
    }

    #[test]
    fn test_body_contains_only_payload() {
        let n = Notification::new("abc123", Payload::new().alert("hi"))
            .with_topic("com.example.app")
            .with_priority(PRIORITY_HIGH)
            .with_collapse_id("c");

        let body: serde_json::Value = serde_json::from_slice(&n.encode_body().unwrap()).unwrap();
        assert_eq!(body, json!({ "aps": { "alert": "hi" } }));
    }

    #[test]
    fn test_arbitrary_serializable_payload() {
        let n = Notification::new("t", json!({ "aps": { "badge": 2 }, "x": true }));
        let body: serde_json::Value = serde_json::from_slice(&n.encode_body().unwrap()).unwrap();
        assert_eq!(body, n.payload);
    }

    #[test]
    fn test_unserializable_payload_fails_to_encode() {
        use std::collections::HashMap;

        // JSON object keys must be strings.
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], "v");
        let n = Notification::new("t", bad);
        assert!(n.encode_body().is_err());
    }

    #[test]
    fn test_token_prefix() {
        let n = Notification::new("0123456789abcdef", ());
        assert_eq!(n.token_prefix(), "01234567");
    }
}
