//! APNs push client library
//!
//! Sends notifications to the Apple Push Notification service over HTTP/2,
//! authenticating with a TLS client certificate.
//!
//! - [`notification`] and [`payload`] describe what to send.
//! - [`shared::clients`] holds the certificate, transport and push client.
//! - [`response`] is the gateway's verdict.
//! - [`config`] and [`cli`] wire it up as the `apns-push` binary.

pub mod cli;
pub mod config;
pub mod errors;
pub mod notification;
pub mod payload;
pub mod response;
pub mod shared;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigManager};
pub use errors::{PushError, PushResult};
pub use notification::Notification;
pub use payload::Payload;
pub use response::{Reason, Response};
pub use shared::clients::{
    ApnsClient, CertificateTransport, ClientCertificate, ClientConfig, Endpoint, Transport,
};
