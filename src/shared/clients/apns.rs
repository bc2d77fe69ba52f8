//! Push orchestrator
//!
//! [`ApnsClient`] turns a [`Notification`] into `POST {host}/3/device/{token}`
//! on a shared [`Transport`], and turns the gateway's reply into a
//! [`Response`]. It holds no mutable state of its own; concurrent pushes are
//! multiplexed by the transport's HTTP/2 connection.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tokio::runtime::RuntimeFlavor;
use tracing::{debug, warn};
use url::Url;

use super::traits::PushClient;
use super::transport::Transport;
use crate::errors::{ErrorContextExt, PushError, PushResult};
use crate::notification::{notification_headers, Notification, HEADER_APNS_ID};
use crate::response::Response;

/// Gateway host for development builds.
pub const HOST_DEVELOPMENT: &str = "https://api.development.push.apple.com";
/// Gateway host for production builds.
pub const HOST_PRODUCTION: &str = "https://api.push.apple.com";

/// One of the two well-known gateway environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    #[default]
    Development,
    Production,
}

impl Endpoint {
    pub fn host(&self) -> &'static str {
        match self {
            Endpoint::Development => HOST_DEVELOPMENT,
            Endpoint::Production => HOST_PRODUCTION,
        }
    }
}

/// Where pushes are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
}

impl ClientConfig {
    /// Target an explicit host, e.g. a local gateway stand-in.
    pub fn with_host(host: impl Into<String>) -> PushResult<Self> {
        let host = host.into();
        let parsed = Url::parse(&host)
            .map_err(|e| PushError::config_with_source(format!("invalid gateway host '{host}'"), e))?;
        if !matches!(parsed.scheme(), "https" | "http") {
            return Err(PushError::config(format!(
                "gateway host '{host}' must use http or https"
            )));
        }
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
        })
    }
}

impl From<Endpoint> for ClientConfig {
    fn from(endpoint: Endpoint) -> Self {
        Self {
            host: endpoint.host().to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Endpoint::default().into()
    }
}

/// URL `{host}/3/device/{token}` for a device token on a host.
///
/// The token is pushed as a single path segment, so characters such as `?`,
/// `#` or `/` are percent-encoded and cannot change the request target.
pub fn device_url(host: &str, device_token: &str) -> PushResult<Url> {
    let mut url = Url::parse(host)
        .map_err(|e| PushError::config_with_source(format!("invalid gateway host '{host}'"), e))?;
    url.path_segments_mut()
        .map_err(|()| PushError::config(format!("gateway host '{host}' cannot carry a path")))?
        .pop_if_empty()
        .extend(["3", "device", device_token]);
    Ok(url)
}

/// Build a [`Response`] from the parts of a gateway reply.
///
/// An empty body is the normal success case and yields no extra fields. A
/// non-empty body that is not valid JSON is a decode error, and the status
/// and id are dropped with it.
pub fn decode_response(
    status_code: u16,
    apns_id: Option<String>,
    body: &[u8],
) -> PushResult<Response> {
    let mut response = if body.iter().all(u8::is_ascii_whitespace) {
        Response::default()
    } else {
        serde_json::from_slice::<Response>(body)
            .map_err(|e| PushError::decode(status_code, "malformed response body", e))?
    };

    response.status_code = status_code;
    response.apns_id = apns_id;
    Ok(response)
}

/// Push orchestrator bound to one transport.
///
/// Clones share the transport, so one `ApnsClient` per certificate can be
/// handed to any number of tasks.
#[derive(Clone)]
pub struct ApnsClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl ApnsClient {
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// A copy of this client targeting the development gateway.
    pub fn development(&self) -> Self {
        self.with_config(Endpoint::Development.into())
    }

    /// A copy of this client targeting the production gateway.
    pub fn production(&self) -> Self {
        self.with_config(Endpoint::Production.into())
    }

    /// A copy of this client with a different target, sharing the transport.
    pub fn with_config(&self, config: ClientConfig) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config,
        }
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Wrap this client for use from synchronous code.
    pub fn blocking(self) -> BlockingApnsClient {
        BlockingApnsClient::new(self)
    }

    /// Send one notification and wait for the gateway's verdict.
    ///
    /// `Ok` means the gateway answered; check [`Response::sent`] to tell
    /// acceptance from rejection. `Err` means there is no verdict.
    pub async fn push<P>(&self, notification: &Notification<P>) -> PushResult<Response>
    where
        P: Serialize + Sync,
    {
        let body = notification
            .encode_body()
            .map_err(|e| PushError::encoding("payload is not serializable", e))?;

        let url = device_url(&self.config.host, &notification.device_token)?;
        let headers = build_header_map(notification)?;
        let request = self
            .transport
            .http_client()
            .post(url)
            .headers(headers)
            .body(body);

        debug!(
            token = %notification.token_prefix(),
            host = %self.config.host,
            "Pushing notification"
        );
        let started = Instant::now();

        let exchange = async {
            let reply = request.send().await?;
            let status_code = reply.status().as_u16();
            let apns_id = reply
                .headers()
                .get(HEADER_APNS_ID)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = reply.bytes().await?;
            Ok::<_, PushError>((status_code, apns_id, body))
        };

        let (status_code, apns_id, body) = match self.transport.lifetime_scope() {
            Some(scope) => {
                let scope = scope.current();
                tokio::select! {
                    _ = scope.cancelled() => return Err(PushError::Cancelled),
                    result = exchange => result?,
                }
            }
            None => exchange.await?,
        };

        let response = decode_response(status_code, apns_id, &body)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if response.sent() {
            debug!(
                token = %notification.token_prefix(),
                apns_id = ?response.apns_id,
                elapsed_ms,
                "Notification accepted"
            );
        } else {
            warn!(
                token = %notification.token_prefix(),
                status = response.status_code,
                reason = ?response.reason,
                apns_id = ?response.apns_id,
                elapsed_ms,
                "Notification rejected"
            );
        }

        Ok(response)
    }
}

fn build_header_map<P>(notification: &Notification<P>) -> PushResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in notification_headers(notification) {
        let header_value = HeaderValue::from_str(&value).map_err(|_| PushError::InvalidHeader {
            header: name.to_string(),
            value: value.clone(),
        })?;
        headers.insert(HeaderName::from_static(name), header_value);
    }
    Ok(headers)
}

#[async_trait]
impl PushClient for ApnsClient {
    async fn send(&self, notification: &Notification) -> PushResult<Response> {
        self.push(notification).await
    }

    fn host(&self) -> &str {
        ApnsClient::host(self)
    }
}

impl std::fmt::Debug for ApnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApnsClient")
            .field("host", &self.config.host)
            .field("certificate", &self.transport.certificate().fingerprint())
            .finish()
    }
}

/// Synchronous wrapper around [`ApnsClient`]
///
/// Usable from plain threads and from inside a tokio runtime of either
/// flavor. On a current-thread runtime the push runs on a helper thread,
/// since that runtime cannot be blocked in place.
pub struct BlockingApnsClient {
    inner: ApnsClient,
}

impl BlockingApnsClient {
    pub fn new(inner: ApnsClient) -> Self {
        Self { inner }
    }

    /// Send a notification (blocking)
    pub fn push<P>(&self, notification: &Notification<P>) -> PushResult<Response>
    where
        P: Serialize + Sync,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.inner.push(notification)))
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| self.push_on_own_runtime(notification))
                    .join()
                    .unwrap_or_else(|_| {
                        Err(PushError::Internal {
                            message: "blocking push thread panicked".to_string(),
                            source: None,
                        })
                    })
            }),
            Err(_) => self.push_on_own_runtime(notification),
        }
    }

    fn push_on_own_runtime<P>(&self, notification: &Notification<P>) -> PushResult<Response>
    where
        P: Serialize + Sync,
    {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .with_context("failed to create runtime")?;
        rt.block_on(self.inner.push(notification))
    }

    pub fn inner(&self) -> &ApnsClient {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::PRIORITY_HIGH;
    use crate::payload::Payload;
    use crate::response::{Reason, STATUS_SENT};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_device_url() {
        assert_eq!(
            device_url(HOST_PRODUCTION, "abc123").unwrap().as_str(),
            "https://api.push.apple.com/3/device/abc123"
        );
        let url = device_url("http://127.0.0.1:8080", "abc123").unwrap();
        assert_eq!(url.path(), "/3/device/abc123");
    }

    #[test]
    fn test_device_url_keeps_token_in_one_segment() {
        let url = device_url(HOST_PRODUCTION, "abc?x=1#frag").unwrap();
        assert_eq!(url.host_str(), Some("api.push.apple.com"));
        assert_eq!(url.path(), "/3/device/abc%3Fx=1%23frag");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = device_url(HOST_PRODUCTION, "../../evil").unwrap();
        assert_eq!(url.path_segments().unwrap().count(), 3);
        assert!(url.path().starts_with("/3/device/"));
    }

    #[test]
    fn test_endpoint_hosts() {
        assert_eq!(ClientConfig::from(Endpoint::Development).host, HOST_DEVELOPMENT);
        assert_eq!(ClientConfig::from(Endpoint::Production).host, HOST_PRODUCTION);
        assert_eq!(ClientConfig::default().host, HOST_DEVELOPMENT);
    }

    #[test]
    fn test_host_override_validation() {
        let config = ClientConfig::with_host("http://localhost:2197/").unwrap();
        assert_eq!(config.host, "http://localhost:2197");

        assert!(ClientConfig::with_host("localhost").is_err());
        assert!(ClientConfig::with_host("ftp://example.com").is_err());
    }

    #[test]
    fn test_empty_body_decodes_to_no_fields() {
        for body in [&b""[..], b"\n", b"  \r\n"] {
            let response = decode_response(STATUS_SENT, Some("id-1".into()), body).unwrap();
            assert!(response.sent());
            assert_eq!(response.apns_id.as_deref(), Some("id-1"));
            assert_eq!(response.reason, None);
            assert_eq!(response.timestamp, None);
        }
    }

    #[test]
    fn test_rejection_body_keeps_header_id() {
        let response =
            decode_response(400, Some("id-2".into()), br#"{"reason":"BadDeviceToken"}"#).unwrap();
        assert!(!response.sent());
        assert_eq!(response.reason, Some(Reason::BadDeviceToken));
        assert_eq!(response.apns_id.as_deref(), Some("id-2"));
    }

    #[test]
    fn test_expired_token_timestamp() {
        let response = decode_response(
            410,
            None,
            br#"{"reason":"Unregistered","timestamp":1420716052}"#,
        )
        .unwrap();
        assert_eq!(
            response.token_invalid_since(),
            Some(Utc.timestamp_opt(1_420_716_052, 0).unwrap())
        );
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let err = decode_response(STATUS_SENT, Some("id-3".into()), b"<html>oops</html>").unwrap_err();
        assert!(err.is_ambiguous());
        match err {
            PushError::Decode { status_code, .. } => assert_eq!(status_code, STATUS_SENT),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_header_map_rejects_invalid_values() {
        let n = Notification::new("t", Payload::new()).with_topic("bad\ntopic");
        match build_header_map(&n) {
            Err(PushError::InvalidHeader { header, .. }) => assert_eq!(header, "apns-topic"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_header_map_contents() {
        let n = Notification::new("t", Payload::new())
            .with_topic("com.example.app")
            .with_priority(PRIORITY_HIGH);
        let headers = build_header_map(&n).unwrap();
        assert_eq!(headers["content-type"], "application/json; charset=utf-8");
        assert_eq!(headers["apns-topic"], "com.example.app");
        assert_eq!(headers["apns-priority"], "10");
        assert!(headers.get("apns-expiration").is_none());
    }
}
