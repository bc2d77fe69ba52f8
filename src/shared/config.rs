use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{PushError, PushResult};
use crate::shared::clients::{
    CertificateTransport, ClientCertificate, ClientConfig, DirectDialer, Endpoint, ProxyDialer,
    TransportConfig,
};

/// Main configuration structure
///
/// Process-level settings: which gateway to target, how to reach it, which
/// certificate to authenticate with, and notification defaults for the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub certificate: CertificateConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway target and connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub endpoint: Endpoint,
    /// Overrides the endpoint host when set.
    pub host: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Route connections through this proxy (sandboxed hosting).
    pub proxy_url: Option<String>,
}

fn default_connect_timeout_secs() -> u64 {
    20
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Development,
            host: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            proxy_url: None,
        }
    }
}

impl GatewayConfig {
    /// Target for the push orchestrator.
    pub fn client_config(&self) -> PushResult<ClientConfig> {
        match &self.host {
            Some(host) => ClientConfig::with_host(host.clone()),
            None => Ok(self.endpoint.into()),
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..Default::default()
        }
    }

    /// Build the transport with the dialer these settings select.
    pub fn build_transport(&self, certificate: ClientCertificate) -> PushResult<CertificateTransport> {
        let connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        match &self.proxy_url {
            Some(proxy_url) => CertificateTransport::new(
                certificate,
                ProxyDialer::new(proxy_url.clone()).with_connect_timeout(connect_timeout),
                self.transport_config(),
            ),
            None => CertificateTransport::new(
                certificate,
                DirectDialer::new(connect_timeout),
                self.transport_config(),
            ),
        }
    }
}

/// Client certificate location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateConfig {
    /// PEM bundle with the private key and certificate chain.
    pub path: Option<PathBuf>,
}

impl CertificateConfig {
    pub fn load(&self) -> PushResult<ClientCertificate> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| PushError::config("certificate.path is not set"))?;
        ClientCertificate::from_pem_file(path)
    }
}

/// Defaults applied by the CLI when a flag is not given
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub topic: Option<String>,
    pub priority: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for daily log files; console only when unset.
    pub log_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_path: None,
        }
    }
}
