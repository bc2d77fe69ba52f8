use async_trait::async_trait;

use crate::errors::PushResult;
use crate::notification::Notification;
use crate::response::Response;

/// Push interface for code that only needs to send notifications.
///
/// Implemented by [`ApnsClient`](super::ApnsClient); callers that want to
/// substitute their own sender in tests depend on this trait instead.
#[async_trait]
pub trait PushClient: Send + Sync {
    /// Send one notification and return the gateway's verdict.
    async fn send(&self, notification: &Notification) -> PushResult<Response>;

    /// Gateway host the client targets.
    fn host(&self) -> &str;
}
