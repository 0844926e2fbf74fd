//! Notification boundary.
//!
//! Delivery (email/SMS) is an external concern. Sends are fire-and-forget:
//! the settlement path never waits on them and a failed send never fails a
//! ride operation.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

/// Outbound notification channel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, recipient: Uuid, subject: &str, body: &str);
}

/// Sink that logs instead of delivering. Default for tests and
/// single-process runs.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, recipient: Uuid, subject: &str, body: &str) {
        tracing::info!(recipient = %recipient, subject, body, "notification");
    }
}

/// Dispatch without awaiting delivery.
pub fn notify_detached(sink: Arc<dyn NotificationSink>, recipient: Uuid, subject: &str, body: &str) {
    let subject = subject.to_owned();
    let body = body.to_owned();
    tokio::spawn(async move {
        sink.notify(recipient, &subject, &body).await;
    });
}
