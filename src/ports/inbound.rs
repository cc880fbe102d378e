//! Inbound port. CLI (adapter) calls into the application.

use std::path::PathBuf;

/// Dispatch entry point.
#[async_trait::async_trait]
pub trait NotificationPort: Send + Sync {
    /// Deliver over every configured channel. `true` only when no invoked channel failed.
    async fn send_notification(&self, subject: &str, body: &str, attachments: &[PathBuf]) -> bool;
}
