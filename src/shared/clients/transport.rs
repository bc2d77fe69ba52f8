//! Certificate-bound HTTP/2 transport
//!
//! A [`Transport`] hands out one long-lived `reqwest::Client` that carries the
//! TLS client certificate. The client multiplexes concurrent pushes over a
//! shared connection, so a transport should be built once per certificate and
//! reused; reconnecting per push looks like abuse to the gateway.
//!
//! How the network is reached is decided by a [`Dialer`]:
//!
//! - [`DirectDialer`] dials TCP+TLS to the gateway itself.
//! - [`ProxyDialer`] routes every dial through a platform socket proxy, as
//!   sandboxed hosting environments require, and carries a rebindable
//!   [`LifetimeScope`].
//!
//! Callers only depend on the [`Transport`] trait.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::certificate::ClientCertificate;
use crate::errors::{PushError, PushResult};

/// Upper bound for establishing a direct connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);
/// Upper bound for establishing a proxied connection.
pub const DEFAULT_PROXY_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
/// Upper bound for a whole request: connect, redirects and body read.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of an authenticated, connection-reusing HTTP client.
pub trait Transport: Send + Sync {
    /// Ready-to-use client bound to [`Transport::certificate`].
    fn http_client(&self) -> &Client;

    /// The certificate this transport authenticates with.
    fn certificate(&self) -> &ClientCertificate;

    /// Rebindable cancellation scope, for transports that support one.
    fn lifetime_scope(&self) -> Option<&dyn LifetimeScope> {
        None
    }
}

/// Externally supplied lifetime that governs whole pushes.
///
/// A push reads the current scope when it starts, and the scope covers the
/// dial and the request/response exchange alike: cancelling it aborts the
/// push wherever it is. Rebinding only affects pushes started afterwards.
pub trait LifetimeScope: Send + Sync {
    fn rebind(&self, scope: CancellationToken);

    fn current(&self) -> CancellationToken;
}

/// Strategy for reaching the network.
pub trait Dialer: Send + Sync {
    /// Apply this strategy's connection settings to the client builder.
    fn configure(&self, builder: ClientBuilder) -> PushResult<ClientBuilder>;

    fn name(&self) -> &'static str;

    fn lifetime_scope(&self) -> Option<&dyn LifetimeScope> {
        None
    }
}

/// Dials the gateway directly.
#[derive(Debug, Clone)]
pub struct DirectDialer {
    pub connect_timeout: Duration,
}

impl DirectDialer {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for DirectDialer {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl Dialer for DirectDialer {
    fn configure(&self, builder: ClientBuilder) -> PushResult<ClientBuilder> {
        Ok(builder.no_proxy().connect_timeout(self.connect_timeout))
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// Dials through a platform socket proxy.
#[derive(Debug)]
pub struct ProxyDialer {
    pub proxy_url: String,
    pub connect_timeout: Duration,
    scope: RwLock<CancellationToken>,
}

impl ProxyDialer {
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            proxy_url: proxy_url.into(),
            connect_timeout: DEFAULT_PROXY_CONNECT_TIMEOUT,
            scope: RwLock::new(CancellationToken::new()),
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_scope(self, scope: CancellationToken) -> Self {
        self.rebind(scope);
        self
    }
}

impl Dialer for ProxyDialer {
    fn configure(&self, builder: ClientBuilder) -> PushResult<ClientBuilder> {
        let proxy = Proxy::all(&self.proxy_url).map_err(|e| {
            PushError::config_with_source(format!("invalid proxy url '{}'", self.proxy_url), e)
        })?;
        Ok(builder.proxy(proxy).connect_timeout(self.connect_timeout))
    }

    fn name(&self) -> &'static str {
        "proxy"
    }

    fn lifetime_scope(&self) -> Option<&dyn LifetimeScope> {
        Some(self)
    }
}

impl LifetimeScope for ProxyDialer {
    fn rebind(&self, scope: CancellationToken) {
        // A poisoned lock still holds a valid token; keep going with it.
        let mut current = self.scope.write().unwrap_or_else(|e| e.into_inner());
        *current = scope;
        debug!(proxy = %self.proxy_url, "Rebound dial lifetime scope");
    }

    fn current(&self) -> CancellationToken {
        self.scope
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Client-wide settings that do not depend on the dial strategy.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub request_timeout: Duration,
    pub keep_alive_interval: Duration,
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            keep_alive_interval: Duration::from_secs(60),
            user_agent: Some(concat!("apns-push/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

/// The transport: one certificate, one client, one dial strategy.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct CertificateTransport {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    certificate: ClientCertificate,
    dialer: Box<dyn Dialer>,
}

impl CertificateTransport {
    /// Build the HTTP client. Does not connect until the first push.
    pub fn new(
        certificate: ClientCertificate,
        dialer: impl Dialer + 'static,
        config: TransportConfig,
    ) -> PushResult<Self> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .identity(certificate.identity()?)
            .timeout(config.request_timeout)
            .http2_keep_alive_interval(config.keep_alive_interval)
            .http2_keep_alive_while_idle(true)
            .http2_adaptive_window(true)
            .tcp_keepalive(config.keep_alive_interval)
            .pool_idle_timeout(None::<Duration>);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let builder = dialer.configure(builder)?;
        let client = builder
            .build()
            .map_err(|e| PushError::certificate_with_source("failed to build TLS client", e))?;

        info!(
            dialer = dialer.name(),
            subject = %certificate.leaf_subject(),
            request_timeout_secs = config.request_timeout.as_secs(),
            "Created certificate transport"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                certificate,
                dialer: Box::new(dialer),
            }),
        })
    }

    /// Direct-dial transport with default timeouts.
    pub fn direct(certificate: ClientCertificate) -> PushResult<Self> {
        Self::new(certificate, DirectDialer::default(), TransportConfig::default())
    }

    pub fn dialer_name(&self) -> &'static str {
        self.inner.dialer.name()
    }
}

impl Transport for CertificateTransport {
    fn http_client(&self) -> &Client {
        &self.inner.client
    }

    fn certificate(&self) -> &ClientCertificate {
        &self.inner.certificate
    }

    fn lifetime_scope(&self) -> Option<&dyn LifetimeScope> {
        self.inner.dialer.lifetime_scope()
    }
}

impl std::fmt::Debug for CertificateTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateTransport")
            .field("dialer", &self.inner.dialer.name())
            .field("fingerprint", &self.inner.certificate.fingerprint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_PEM: &[u8] = include_bytes!("../../../tests/fixtures/client.pem");

    fn certificate() -> ClientCertificate {
        ClientCertificate::from_pem(CLIENT_PEM).unwrap()
    }

    #[tokio::test]
    async fn test_direct_transport_has_no_scope() {
        let transport = CertificateTransport::direct(certificate()).unwrap();
        assert_eq!(transport.dialer_name(), "direct");
        assert!(transport.lifetime_scope().is_none());
        assert_eq!(transport.certificate().chain_len(), 1);
    }

    #[tokio::test]
    async fn test_proxy_transport_exposes_scope() {
        let transport = CertificateTransport::new(
            certificate(),
            ProxyDialer::new("http://127.0.0.1:3128"),
            TransportConfig::default(),
        )
        .unwrap();

        assert_eq!(transport.dialer_name(), "proxy");
        assert!(transport.lifetime_scope().is_some());
    }

    #[tokio::test]
    async fn test_invalid_proxy_url_fails_at_construction() {
        let result = CertificateTransport::new(
            certificate(),
            ProxyDialer::new("not a url"),
            TransportConfig::default(),
        );
        assert_eq!(result.unwrap_err().category(), "config");
    }

    #[test]
    fn test_rebind_replaces_current_scope() {
        let dialer = ProxyDialer::new("http://127.0.0.1:3128");
        let first = dialer.current();

        let replacement = CancellationToken::new();
        dialer.rebind(replacement.clone());
        replacement.cancel();

        assert!(dialer.current().is_cancelled());
        assert!(!first.is_cancelled());
    }

    #[tokio::test]
    async fn test_clones_share_one_client() {
        let transport = CertificateTransport::direct(certificate()).unwrap();
        let clone = transport.clone();
        assert!(Arc::ptr_eq(&transport.inner, &clone.inner));
    }
}
