//! Gateway clients
//!
//! ## Architecture
//!
//! - **ClientCertificate**: parsed TLS identity, validated at load time
//! - **Transport**: certificate-bound HTTP/2 client with a pluggable dialer
//! - **ApnsClient**: builds requests from notifications and decodes replies
//! - **ClientManager**: caches one client per certificate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use apns_push::notification::Notification;
//! use apns_push::payload::Payload;
//! use apns_push::shared::clients::{ApnsClient, CertificateTransport, ClientCertificate, Endpoint};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let certificate = ClientCertificate::from_pem_file("push-cert.pem")?;
//! let transport = CertificateTransport::direct(certificate)?;
//! let client = ApnsClient::new(Arc::new(transport), Endpoint::Production.into());
//!
//! let notification = Notification::new("device-token", Payload::new().alert("Hello"))
//!     .with_topic("com.example.app");
//! let response = client.push(&notification).await?;
//! if !response.sent() {
//!     eprintln!("rejected: {:?}", response.reason);
//! }
//! # Ok(())
//! # }
//! ```

pub mod apns;
pub mod certificate;
pub mod manager;
pub mod traits;
pub mod transport;

pub use apns::{
    decode_response, device_url, ApnsClient, BlockingApnsClient, ClientConfig, Endpoint,
    HOST_DEVELOPMENT, HOST_PRODUCTION,
};
pub use certificate::{ChainCertificate, ClientCertificate};
pub use manager::ClientManager;
pub use traits::PushClient;
pub use transport::{
    CertificateTransport, Dialer, DirectDialer, LifetimeScope, ProxyDialer, Transport,
    TransportConfig,
};
