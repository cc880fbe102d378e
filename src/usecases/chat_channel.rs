//! Chat channel. Formats the notification for chat, splits it into chunks
//! and delivers them through the session, retrying the whole attempt.

use crate::adapters::report::read_report;
use crate::domain::{
    DomainError, NotificationRequest, RecipientId, format_for_chat, split_into_chunks,
};
use crate::ports::{NotificationChannel, SessionProvider};
use crate::shared::ChatSettings;
use crate::usecases::email_channel::base_name;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct ChatChannel {
    session: Arc<dyn SessionProvider>,
    settings: ChatSettings,
}

impl ChatChannel {
    pub fn new(session: Arc<dyn SessionProvider>, settings: ChatSettings) -> Self {
        Self { session, settings }
    }

    /// One full delivery attempt. Any error restarts from the login check.
    async fn try_deliver(&self, request: &NotificationRequest) -> Result<(), DomainError> {
        if !self.session.ensure_login().await {
            return Err(DomainError::Session("failed to ensure chat session".into()));
        }

        let receiver = &self.settings.receiver;
        let recipient = self
            .session
            .resolve_recipient(receiver)
            .await
            .ok_or_else(|| DomainError::Session(format!("cannot find receiver: {}", receiver)))?;

        let report = match request.report_csv() {
            Some(path) => match read_report(path).await {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(error = %e, "report not rendered");
                    None
                }
            },
            None => None,
        };

        let message = format_for_chat(&request.subject, &request.body, report.as_ref());
        self.send_chunks(&message.to_string(), &recipient).await?;

        for path in request.file_attachments() {
            // leading blank line separates the notice from the report above it
            let notice = format!("\n📎 Sending file: {}", base_name(path));
            if !self.session.send_message(&notice, &recipient).await {
                return Err(DomainError::Session(format!(
                    "failed to announce file {}",
                    path.display()
                )));
            }
            if !self.session.send_file(path, &recipient).await {
                warn!(path = %path.display(), "file transfer failed; continuing");
            }
        }
        Ok(())
    }

    async fn send_chunks(&self, text: &str, recipient: &RecipientId) -> Result<(), DomainError> {
        let chunks = split_into_chunks(text, self.settings.chunk_size);
        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                pause(self.settings.chunk_delay).await;
            }
            if !self.session.send_message(chunk, recipient).await {
                return Err(DomainError::Session(format!(
                    "failed to send message chunk {}/{}",
                    i + 1,
                    total
                )));
            }
        }
        debug!(chunks = total, to = %recipient.display_name, "message chunks sent");
        Ok(())
    }
}

#[async_trait::async_trait]
impl NotificationChannel for ChatChannel {
    async fn send(&self, request: &NotificationRequest) -> bool {
        let max_attempts = self.settings.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.try_deliver(request).await {
                Ok(()) => {
                    info!(subject = %request.subject, attempt, "Chat message sent successfully");
                    return true;
                }
                Err(e) if attempt < max_attempts => {
                    warn!(attempt, max_attempts, error = %e, "Chat send failed, retrying");
                    pause(self.settings.retry_delay).await;
                }
                Err(e) => {
                    error!(attempt, max_attempts, error = %e, "Failed to send chat message");
                }
            }
        }
        false
    }

    fn name(&self) -> &'static str {
        "chat"
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockSessionProvider, SessionCall};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Context, SubscriberExt};

    const RECEIVER: &str = "Trend Watch";

    /// Counts WARN events emitted by this module.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let meta = event.metadata();
            if *meta.level() == tracing::Level::WARN
                && meta.target() == "trend_notify::usecases::chat_channel"
            {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn settings() -> ChatSettings {
        ChatSettings {
            chunk_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..ChatSettings::new(RECEIVER)
        }
    }

    fn channel(session: &Arc<MockSessionProvider>, settings: ChatSettings) -> ChatChannel {
        ChatChannel::new(session.clone(), settings)
    }

    #[tokio::test]
    async fn recovers_after_two_login_failures() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let session = Arc::new(MockSessionProvider::new([RECEIVER]).with_login_failures(2));
        let ch = channel(&session, settings());

        assert!(ch.send(&NotificationRequest::new("Daily", "hello")).await);
        assert_eq!(session.login_attempts().await, 3);
        assert_eq!(warnings.load(Ordering::SeqCst), 2);
        assert_eq!(
            session.messages().await,
            vec![format!("📊 Daily\n{}\nhello", "=".repeat(30))]
        );
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let session =
            Arc::new(MockSessionProvider::new([RECEIVER]).with_login_failures(usize::MAX));
        let ch = channel(&session, settings());

        assert!(!ch.send(&NotificationRequest::new("s", "b")).await);
        assert_eq!(session.login_attempts().await, 3);
        assert!(session.messages().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_receiver_fails_every_attempt() {
        let session = Arc::new(MockSessionProvider::new(["Someone Else"]));
        let ch = channel(&session, settings());

        assert!(!ch.send(&NotificationRequest::new("s", "b")).await);
        let resolves = session
            .calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, SessionCall::Resolve(_)))
            .count();
        assert_eq!(resolves, 3);
    }

    #[tokio::test]
    async fn long_messages_go_out_in_order_within_chunk_size() {
        let session = Arc::new(MockSessionProvider::new([RECEIVER]));
        let ch = channel(
            &session,
            ChatSettings {
                chunk_size: 40,
                ..settings()
            },
        );
        let body: String = (1..=20).map(|i| format!("<p>line number {}</p>\n", i)).collect();

        assert!(ch.send(&NotificationRequest::new("Long", body)).await);
        let messages = session.messages().await;
        assert!(messages.len() > 1);
        assert!(messages.iter().all(|m| m.chars().count() <= 40));
        let joined = messages.join("\n");
        let first = joined.find("line number 1\n").unwrap();
        let last = joined.find("line number 20").unwrap();
        assert!(first < last);
    }

    #[tokio::test]
    async fn failed_chunk_restarts_the_attempt() {
        let session = Arc::new(MockSessionProvider::new([RECEIVER]).with_message_failure_at(1));
        let ch = channel(
            &session,
            ChatSettings {
                chunk_size: 20,
                ..settings()
            },
        );
        let body = "first line here\nsecond line here\nthird line here";

        assert!(ch.send(&NotificationRequest::new("S", body)).await);
        assert_eq!(session.login_attempts().await, 2);
        let messages = session.messages().await;
        // first chunk of the failed attempt, then the full retry
        assert_eq!(messages[0], messages[1]);
        assert!(messages.last().unwrap().contains("third line here"));
    }

    #[tokio::test]
    async fn csv_report_is_rendered_and_files_are_announced() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("report.csv");
        std::fs::write(
            &csv,
            "keyword,type,related_keywords,value\nrust,rising,rust async,+350%\nrust,top,rust book,100\n",
        )
        .unwrap();
        let chart = dir.path().join("chart.png");
        std::fs::write(&chart, b"png").unwrap();

        let session = Arc::new(MockSessionProvider::new([RECEIVER]));
        let ch = channel(&session, settings());
        let request =
            NotificationRequest::new("Trends", "<b>Summary</b>").with_attachments([csv, chart.clone()]);

        assert!(ch.send(&request).await);
        let messages = session.messages().await;
        assert!(messages[0].contains("📌 Detailed report:"));
        assert!(messages[0].contains("🔍 rust"));
        assert!(messages[0].contains("    • rust async (+350%)"));
        assert_eq!(messages[1], "\n📎 Sending file: chart.png");

        let files: Vec<PathBuf> = session
            .calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                SessionCall::File(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(files, vec![chart]);
    }

    #[tokio::test]
    async fn unreadable_report_is_skipped() {
        let session = Arc::new(MockSessionProvider::new([RECEIVER]));
        let ch = channel(&session, settings());
        let request = NotificationRequest::new("S", "body")
            .with_attachments([PathBuf::from("/nonexistent/report.csv")]);

        assert!(ch.send(&request).await);
        let messages = session.messages().await;
        assert_eq!(messages.len(), 1);
        assert!(!messages[0].contains("Detailed report"));
    }

    #[tokio::test]
    async fn file_transfer_failure_does_not_fail_delivery() {
        let session = Arc::new(MockSessionProvider::new([RECEIVER]).with_file_failures());
        let ch = channel(&session, settings());
        let request =
            NotificationRequest::new("S", "body").with_attachments([PathBuf::from("chart.png")]);

        assert!(ch.send(&request).await);
        assert_eq!(session.login_attempts().await, 1);
    }
}
