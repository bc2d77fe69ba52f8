//! Gateway outcomes
//!
//! A [`Response`] is produced for every push that got an HTTP reply, whether
//! the gateway accepted the notification or rejected it. Rejections carry a
//! [`Reason`]; deciding what to do about them is left to the caller.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The notification was accepted.
pub const STATUS_SENT: u16 = 200;
/// Bad request.
pub const STATUS_BAD_REQUEST: u16 = 400;
/// There was an error with the certificate.
pub const STATUS_FORBIDDEN: u16 = 403;
/// The request used a method other than POST.
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;
/// The device token is no longer active for the topic.
pub const STATUS_GONE: u16 = 410;
/// The notification payload was too large.
pub const STATUS_PAYLOAD_TOO_LARGE: u16 = 413;
/// The server received too many requests for the same device token.
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;
/// Internal server error.
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;
/// The server is shutting down and unavailable.
pub const STATUS_SERVICE_UNAVAILABLE: u16 = 503;

/// Rejection reason reported by the gateway.
///
/// Unknown strings are kept verbatim in [`Reason::Other`] so a newer gateway
/// never breaks decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reason {
    BadCollapseId,
    BadDeviceToken,
    BadExpirationDate,
    BadMessageId,
    BadPriority,
    BadTopic,
    DeviceTokenNotForTopic,
    DuplicateHeaders,
    IdleTimeout,
    MissingDeviceToken,
    MissingTopic,
    PayloadEmpty,
    TopicDisallowed,
    BadCertificate,
    BadCertificateEnvironment,
    ExpiredProviderToken,
    Forbidden,
    InvalidProviderToken,
    MissingProviderToken,
    BadPath,
    MethodNotAllowed,
    Unregistered,
    ExpiredToken,
    PayloadTooLarge,
    TooManyProviderTokenUpdates,
    TooManyRequests,
    InternalServerError,
    ServiceUnavailable,
    Shutdown,
    Other(String),
}

impl Reason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::BadCollapseId => "BadCollapseId",
            Self::BadDeviceToken => "BadDeviceToken",
            Self::BadExpirationDate => "BadExpirationDate",
            Self::BadMessageId => "BadMessageId",
            Self::BadPriority => "BadPriority",
            Self::BadTopic => "BadTopic",
            Self::DeviceTokenNotForTopic => "DeviceTokenNotForTopic",
            Self::DuplicateHeaders => "DuplicateHeaders",
            Self::IdleTimeout => "IdleTimeout",
            Self::MissingDeviceToken => "MissingDeviceToken",
            Self::MissingTopic => "MissingTopic",
            Self::PayloadEmpty => "PayloadEmpty",
            Self::TopicDisallowed => "TopicDisallowed",
            Self::BadCertificate => "BadCertificate",
            Self::BadCertificateEnvironment => "BadCertificateEnvironment",
            Self::ExpiredProviderToken => "ExpiredProviderToken",
            Self::Forbidden => "Forbidden",
            Self::InvalidProviderToken => "InvalidProviderToken",
            Self::MissingProviderToken => "MissingProviderToken",
            Self::BadPath => "BadPath",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::Unregistered => "Unregistered",
            Self::ExpiredToken => "ExpiredToken",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::TooManyProviderTokenUpdates => "TooManyProviderTokenUpdates",
            Self::TooManyRequests => "TooManyRequests",
            Self::InternalServerError => "InternalServerError",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::Shutdown => "Shutdown",
            Self::Other(reason) => reason,
        }
    }

    /// The device token is no longer valid and should not be used again.
    pub fn is_token_expired(&self) -> bool {
        matches!(self, Self::Unregistered | Self::ExpiredToken)
    }
}

impl From<&str> for Reason {
    fn from(value: &str) -> Self {
        match value {
            "BadCollapseId" => Self::BadCollapseId,
            "BadDeviceToken" => Self::BadDeviceToken,
            "BadExpirationDate" => Self::BadExpirationDate,
            "BadMessageId" => Self::BadMessageId,
            "BadPriority" => Self::BadPriority,
            "BadTopic" => Self::BadTopic,
            "DeviceTokenNotForTopic" => Self::DeviceTokenNotForTopic,
            "DuplicateHeaders" => Self::DuplicateHeaders,
            "IdleTimeout" => Self::IdleTimeout,
            "MissingDeviceToken" => Self::MissingDeviceToken,
            "MissingTopic" => Self::MissingTopic,
            "PayloadEmpty" => Self::PayloadEmpty,
            "TopicDisallowed" => Self::TopicDisallowed,
            "BadCertificate" => Self::BadCertificate,
            "BadCertificateEnvironment" => Self::BadCertificateEnvironment,
            "ExpiredProviderToken" => Self::ExpiredProviderToken,
            "Forbidden" => Self::Forbidden,
            "InvalidProviderToken" => Self::InvalidProviderToken,
            "MissingProviderToken" => Self::MissingProviderToken,
            "BadPath" => Self::BadPath,
            "MethodNotAllowed" => Self::MethodNotAllowed,
            "Unregistered" => Self::Unregistered,
            "ExpiredToken" => Self::ExpiredToken,
            "PayloadTooLarge" => Self::PayloadTooLarge,
            "TooManyProviderTokenUpdates" => Self::TooManyProviderTokenUpdates,
            "TooManyRequests" => Self::TooManyRequests,
            "InternalServerError" => Self::InternalServerError,
            "ServiceUnavailable" => Self::ServiceUnavailable,
            "Shutdown" => Self::Shutdown,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for Reason {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Reason {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Reason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Reason::from(value.as_str()))
    }
}

/// Outcome of one push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status of the attempt.
    #[serde(skip)]
    pub status_code: u16,
    /// Id the gateway associated with the attempt, from the `apns-id`
    /// response header.
    #[serde(skip)]
    pub apns_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
    /// Last moment the token was valid; only sent with an expired token.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "epoch_seconds"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Response {
    /// Whether the gateway accepted the notification.
    pub fn sent(&self) -> bool {
        self.status_code == STATUS_SENT
    }

    /// The token became invalid at the returned moment. Stop sending to it
    /// unless it was re-registered afterwards.
    pub fn token_invalid_since(&self) -> Option<DateTime<Utc>> {
        match &self.reason {
            Some(reason) if reason.is_token_expired() => self.timestamp,
            _ => None,
        }
    }

    /// Rejected because the device token is no longer valid.
    pub fn is_token_expired(&self) -> bool {
        !self.sent() && self.reason.as_ref().is_some_and(Reason::is_token_expired)
    }
}

mod epoch_seconds {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_i64(ts.timestamp()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let seconds = Option::<i64>::deserialize(deserializer)?;
        match seconds {
            None => Ok(None),
            Some(secs) => Utc
                .timestamp_opt(secs, 0)
                .single()
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {secs}"))),
        }
    }
}
