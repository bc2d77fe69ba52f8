//! Client manager
//!
//! Senders that juggle several certificates (one per app, say) keep one
//! [`ApnsClient`] per certificate here instead of building a transport per
//! push. Entries are keyed by the leaf certificate fingerprint and bounded by
//! count and by age.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use super::apns::ApnsClient;
use super::certificate::ClientCertificate;
use crate::errors::PushResult;

/// Default maximum number of cached clients.
pub const DEFAULT_MAX_SIZE: usize = 64;
/// Default maximum age of a cached client.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(10 * 60);

struct Entry {
    client: ApnsClient,
    created_at: Instant,
    last_used: Instant,
}

/// Cache of clients keyed by certificate identity.
///
/// A `max_size` or `max_age` of zero disables that bound.
pub struct ClientManager {
    max_size: usize,
    max_age: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl ClientManager {
    pub fn new(max_size: usize, max_age: Duration) -> Self {
        Self {
            max_size,
            max_age,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached client for `certificate`, if one exists and is not too old.
    pub fn get(&self, certificate: &ClientCertificate) -> Option<ApnsClient> {
        let mut entries = self.lock();
        let key = certificate.fingerprint();

        if entries.get(key).is_some_and(|e| self.is_expired(e)) {
            entries.remove(key);
            debug!(fingerprint = %key, "Dropped expired client");
            return None;
        }

        entries.get_mut(key).map(|entry| {
            entry.last_used = Instant::now();
            entry.client.clone()
        })
    }

    /// Cache `client` under its transport's certificate, replacing any entry
    /// for the same certificate.
    pub fn add(&self, client: ApnsClient) {
        let key = client.transport().certificate().fingerprint().to_string();
        let mut entries = self.lock();

        entries.retain(|_, e| !self.is_expired(e));
        if self.max_size > 0 && !entries.contains_key(&key) && entries.len() >= self.max_size {
            evict_least_recently_used(&mut entries);
        }

        let now = Instant::now();
        entries.insert(
            key,
            Entry {
                client,
                created_at: now,
                last_used: now,
            },
        );
    }

    /// Cached client for `certificate`, or a new one built by `create`.
    pub fn get_or_create<F>(&self, certificate: &ClientCertificate, create: F) -> PushResult<ApnsClient>
    where
        F: FnOnce() -> PushResult<ApnsClient>,
    {
        if let Some(client) = self.get(certificate) {
            return Ok(client);
        }
        let client = create()?;
        self.add(client.clone());
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        !self.max_age.is_zero() && entry.created_at.elapsed() > self.max_age
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ClientManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE, DEFAULT_MAX_AGE)
    }
}

fn evict_least_recently_used(entries: &mut HashMap<String, Entry>) {
    let oldest = entries
        .iter()
        .min_by_key(|(_, e)| e.last_used)
        .map(|(k, _)| k.clone());
    if let Some(key) = oldest {
        entries.remove(&key);
        debug!(fingerprint = %key, "Evicted least recently used client");
    }
}
