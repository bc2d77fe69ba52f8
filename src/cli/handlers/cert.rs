use super::super::CliContext;
use crate::shared::clients::ClientCertificate;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Handler for certificate inspection
pub struct CertHandler<'a> {
    context: &'a CliContext,
}

impl<'a> CertHandler<'a> {
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    pub fn handle_inspect(&self, cert: Option<PathBuf>) -> Result<()> {
        let certificate = match cert {
            Some(path) => ClientCertificate::from_pem_file(&path)
                .with_context(|| format!("Failed to load certificate {}", path.display()))?,
            None => self.context.config_manager.config().certificate.load()?,
        };

        println!("Subject:     {}", certificate.leaf_subject());
        println!("Not after:   {}", certificate.not_after().to_rfc3339());
        if certificate.is_expired() {
            println!("Status:      EXPIRED");
        } else {
            println!("Status:      valid");
        }
        println!("Fingerprint: {}", certificate.fingerprint());
        println!("Chain:       {} certificate(s)", certificate.chain_len());
        for name in certificate.names() {
            println!("Name:        {name}");
        }

        Ok(())
    }
}
