//! Notification payload builder
//!
//! Produces the JSON body the gateway expects: an `aps` dictionary with the
//! system keys, plus any number of custom top-level keys for the app.
//!
//! ```rust
//! use apns_push::payload::Payload;
//!
//! let payload = Payload::new()
//!     .alert_title("Build finished")
//!     .alert_body("All 42 checks passed")
//!     .badge(1)
//!     .sound("default")
//!     .custom("build_id", 4711);
//!
//! let json = serde_json::to_value(&payload).unwrap();
//! assert_eq!(json["aps"]["badge"], 1);
//! assert_eq!(json["build_id"], 4711);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Alert content: either a bare string or a dictionary of display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alert {
    Body(String),
    Dictionary(AlertDictionary),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AlertDictionary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_loc_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_image: Option<String>,
}

/// The `aps` dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Aps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_available: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutable_content: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// Full notification body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub aps: Aps,
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain string alert, replacing any alert dictionary.
    pub fn alert(mut self, text: impl Into<String>) -> Self {
        self.aps.alert = Some(Alert::Body(text.into()));
        self
    }

    pub fn alert_title(self, title: impl Into<String>) -> Self {
        self.with_alert_dictionary(|d| d.title = Some(title.into()))
    }

    pub fn alert_subtitle(self, subtitle: impl Into<String>) -> Self {
        self.with_alert_dictionary(|d| d.subtitle = Some(subtitle.into()))
    }

    pub fn alert_body(self, body: impl Into<String>) -> Self {
        self.with_alert_dictionary(|d| d.body = Some(body.into()))
    }

    pub fn alert_loc_key(self, key: impl Into<String>, args: Vec<String>) -> Self {
        self.with_alert_dictionary(|d| {
            d.loc_key = Some(key.into());
            d.loc_args = Some(args);
        })
    }

    pub fn alert_title_loc_key(self, key: impl Into<String>, args: Vec<String>) -> Self {
        self.with_alert_dictionary(|d| {
            d.title_loc_key = Some(key.into());
            d.title_loc_args = Some(args);
        })
    }

    pub fn alert_action_loc_key(self, key: impl Into<String>) -> Self {
        self.with_alert_dictionary(|d| d.action_loc_key = Some(key.into()))
    }

    pub fn alert_launch_image(self, image: impl Into<String>) -> Self {
        self.with_alert_dictionary(|d| d.launch_image = Some(image.into()))
    }

    pub fn badge(mut self, badge: u32) -> Self {
        self.aps.badge = Some(badge);
        self
    }

    /// Clear the badge on the app icon (badge 0).
    pub fn zero_badge(self) -> Self {
        self.badge(0)
    }

    pub fn sound(mut self, sound: impl Into<String>) -> Self {
        self.aps.sound = Some(sound.into());
        self
    }

    /// Mark as a silent background update.
    pub fn content_available(mut self) -> Self {
        self.aps.content_available = Some(1);
        self
    }

    /// Allow a notification service extension to modify the content.
    pub fn mutable_content(mut self) -> Self {
        self.aps.mutable_content = Some(1);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.aps.category = Some(category.into());
        self
    }

    pub fn thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.aps.thread_id = Some(thread_id.into());
        self
    }

    /// Add a custom top-level key. The key `aps` is reserved and ignored.
    pub fn custom(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "aps" {
            self.custom.insert(key, value.into());
        }
        self
    }

    // A plain-string alert is promoted to a dictionary body when a
    // dictionary field is set afterwards.
    fn with_alert_dictionary(mut self, f: impl FnOnce(&mut AlertDictionary)) -> Self {
        let mut dict = match self.aps.alert.take() {
            Some(Alert::Dictionary(dict)) => dict,
            Some(Alert::Body(body)) => AlertDictionary {
                body: Some(body),
                ..Default::default()
            },
            None => AlertDictionary::default(),
        };
        f(&mut dict);
        self.aps.alert = Some(Alert::Dictionary(dict));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_payload_has_empty_aps() {
        let json = serde_json::to_value(Payload::new()).unwrap();
        assert_eq!(json, json!({ "aps": {} }));
    }

    #[test]
    fn test_plain_alert() {
        let json = serde_json::to_value(Payload::new().alert("hello")).unwrap();
        assert_eq!(json, json!({ "aps": { "alert": "hello" } }));
    }

    #[test]
    fn test_alert_dictionary_uses_kebab_case_keys() {
        let payload = Payload::new()
            .alert_title("Title")
            .alert_loc_key("GAME_INVITE", vec!["Jenna".into()])
            .alert_action_loc_key("PLAY")
            .mutable_content()
            .thread_id("chat-7");

        let json = serde_json::to_value(payload).unwrap();
        assert_eq!(
            json,
            json!({
                "aps": {
                    "alert": {
                        "title": "Title",
                        "loc-key": "GAME_INVITE",
                        "loc-args": ["Jenna"],
                        "action-loc-key": "PLAY"
                    },
                    "mutable-content": 1,
                    "thread-id": "chat-7"
                }
            })
        );
    }

    #[test]
    fn test_plain_alert_promoted_to_dictionary() {
        let payload = Payload::new().alert("body text").alert_title("Title");
        let json = serde_json::to_value(payload).unwrap();
        assert_eq!(json["aps"]["alert"]["body"], "body text");
        assert_eq!(json["aps"]["alert"]["title"], "Title");
    }

    #[test]
    fn test_custom_keys_are_top_level_and_aps_is_reserved() {
        let payload = Payload::new()
            .content_available()
            .custom("order_id", "A-17")
            .custom("aps", "ignored");

        let json = serde_json::to_value(payload).unwrap();
        assert_eq!(json["order_id"], "A-17");
        assert_eq!(json["aps"], json!({ "content-available": 1 }));
    }

    #[test]
    fn test_payload_deserializes_back() {
        let payload = Payload::new()
            .alert_body("Ping")
            .badge(3)
            .sound("chime.caf")
            .category("MESSAGE")
            .custom("meta", json!({ "k": [1, 2] }));

        let bytes = serde_json::to_vec(&payload).unwrap();
        let decoded: Payload = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, payload);
    }
}
