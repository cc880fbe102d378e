//! Dispatch across channels. Email first, then chat; every enabled channel
//! is invoked even after an earlier one fails.

use crate::domain::{DeliveryMethod, NotificationRequest};
use crate::ports::{NotificationChannel, NotificationPort};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct NotificationManager {
    method: DeliveryMethod,
    email: Option<Arc<dyn NotificationChannel>>,
    chat: Option<Arc<dyn NotificationChannel>>,
}

impl NotificationManager {
    pub fn new(method: DeliveryMethod) -> Self {
        Self {
            method,
            email: None,
            chat: None,
        }
    }

    pub fn with_email(mut self, channel: Arc<dyn NotificationChannel>) -> Self {
        self.email = Some(channel);
        self
    }

    pub fn with_chat(mut self, channel: Arc<dyn NotificationChannel>) -> Self {
        self.chat = Some(channel);
        self
    }

    pub fn method(&self) -> DeliveryMethod {
        self.method
    }

    /// Run every channel the method enables. `true` when none of them failed.
    pub async fn dispatch(&self, request: &NotificationRequest) -> bool {
        info!(
            method = %self.method,
            subject = %request.subject,
            attachments = request.attachments.len(),
            "dispatching notification"
        );

        if !self.method.sends_email() && !self.method.sends_chat() {
            warn!(method = %self.method, "no delivery channel enabled; nothing sent");
            return true;
        }

        let mut success = true;
        if self.method.sends_email() {
            success &= run_channel(self.email.as_ref(), "email", request).await;
        }
        if self.method.sends_chat() {
            success &= run_channel(self.chat.as_ref(), "chat", request).await;
        }
        success
    }
}

async fn run_channel(
    channel: Option<&Arc<dyn NotificationChannel>>,
    name: &'static str,
    request: &NotificationRequest,
) -> bool {
    let Some(channel) = channel else {
        error!(channel = name, "channel enabled but not configured");
        return false;
    };
    let ok = channel.send(request).await;
    if ok {
        info!(channel = channel.name(), "channel delivered");
    } else {
        error!(channel = channel.name(), "channel failed");
    }
    ok
}

#[async_trait::async_trait]
impl NotificationPort for NotificationManager {
    async fn send_notification(&self, subject: &str, body: &str, attachments: &[PathBuf]) -> bool {
        let request =
            NotificationRequest::new(subject, body).with_attachments(attachments.iter().cloned());
        self.dispatch(&request).await
    }
}
