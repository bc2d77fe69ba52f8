//! Push command handler
//!
//! Resolves the certificate, transport and target from flags and
//! configuration, sends one notification and prints the gateway's verdict.

use super::super::{CliContext, PushArgs, EXIT_REJECTED};
use crate::config::DefaultsConfig;
use crate::notification::Notification;
use crate::payload::Payload;
use crate::response::Response;
use crate::shared::clients::{ApnsClient, ClientCertificate, ClientConfig, Endpoint, PushClient};
use anyhow::{anyhow, Context, Result};
use chrono::{TimeZone, Utc};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a push the gateway answered.
#[derive(Debug)]
pub struct PushOutcome {
    pub response: Response,
}

impl PushOutcome {
    pub fn exit_status(&self) -> u8 {
        if self.response.sent() {
            0
        } else {
            EXIT_REJECTED
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// Handler for sending notifications
pub struct PushHandler<'a> {
    context: &'a CliContext,
}

impl<'a> PushHandler<'a> {
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    pub async fn handle_push(&self, args: PushArgs) -> Result<PushOutcome> {
        let config = self.context.config_manager.config();

        let certificate = match &args.cert {
            Some(path) => ClientCertificate::from_pem_file(path)
                .with_context(|| format!("Failed to load certificate {}", path.display()))?,
            None => config
                .certificate
                .load()
                .context("No certificate given; pass --cert or set certificate.path")?,
        };
        if certificate.is_expired() {
            warn!(
                not_after = %certificate.not_after(),
                "Client certificate has expired; the gateway will refuse the handshake"
            );
        }

        let target = if let Some(host) = &args.host {
            ClientConfig::with_host(host.clone())?
        } else if args.production {
            Endpoint::Production.into()
        } else {
            config.gateway.client_config()?
        };

        let notification = build_notification(&args, &config.defaults)?;
        let transport = config.gateway.build_transport(certificate)?;
        let client = ApnsClient::new(Arc::new(transport), target);

        send_and_report(&client, &notification).await
    }
}

/// Send through any [`PushClient`] and print the gateway's verdict.
pub async fn send_and_report(
    client: &dyn PushClient,
    notification: &Notification,
) -> Result<PushOutcome> {
    info!(host = %client.host(), token = %notification.token_prefix(), "Sending notification");
    let response = client.send(notification).await?;
    print_response(&response);

    Ok(PushOutcome { response })
}

/// Combine flags with configured defaults into a notification.
pub fn build_notification(args: &PushArgs, defaults: &DefaultsConfig) -> Result<Notification> {
    if args.token.trim().is_empty() {
        return Err(anyhow!("Device token must not be empty"));
    }

    let mut payload = match &args.payload {
        Some(json) => serde_json::from_str::<Payload>(json).context("Invalid --payload JSON")?,
        None => Payload::new(),
    };
    if let Some(alert) = &args.alert {
        payload = if args.title.is_some() {
            payload.alert_body(alert.clone())
        } else {
            payload.alert(alert.clone())
        };
    }
    if let Some(title) = &args.title {
        payload = payload.alert_title(title.clone());
    }
    if let Some(badge) = args.badge {
        payload = payload.badge(badge);
    }
    if let Some(sound) = &args.sound {
        payload = payload.sound(sound.clone());
    }

    let mut notification = Notification::new(args.token.clone(), payload);
    if let Some(topic) = args.topic.as_ref().or(defaults.topic.as_ref()) {
        notification = notification.with_topic(topic.clone());
    }
    if let Some(priority) = args.priority.or(defaults.priority) {
        notification = notification.with_priority(priority);
    }
    if let Some(seconds) = args.expiration {
        let expiration = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| anyhow!("Expiration {seconds} is out of range"))?;
        notification = notification.with_expiration(expiration);
    }
    if let Some(collapse_id) = &args.collapse_id {
        notification = notification.with_collapse_id(collapse_id.clone());
    }
    if let Some(apns_id) = &args.apns_id {
        notification = notification.with_apns_id(apns_id.clone());
    }

    Ok(notification)
}

fn print_response(response: &Response) {
    println!("Status:  {}", response.status_code);
    if let Some(apns_id) = &response.apns_id {
        println!("APNs id: {apns_id}");
    }
    if response.sent() {
        println!("Notification accepted");
        return;
    }
    match &response.reason {
        Some(reason) => println!("Reason:  {reason}"),
        None => println!("Reason:  (none given)"),
    }
    if let Some(since) = response.token_invalid_since() {
        println!("Token invalid since: {}", since.to_rfc3339());
    }
}
