//! Email channel. Compose → probe → SMTP conversation, one stage at a time.
//!
//! Port 465 connects with implicit TLS; any other port connects in plaintext
//! and upgrades with STARTTLS before authenticating. No retry: one failure is
//! final for the call.

use crate::adapters::email::{MailAttachment, compose};
use crate::domain::{DomainError, NotificationRequest};
use crate::ports::{
    ConnectivityProbe, MailSession, MailTransport, NotificationChannel, OutgoingMail,
};
use crate::shared::EmailSettings;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Delivers notifications to the configured mailbox over SMTP.
pub struct EmailChannel {
    settings: EmailSettings,
    transport: Arc<dyn MailTransport>,
    probe: Arc<dyn ConnectivityProbe>,
}

impl EmailChannel {
    pub fn new(
        settings: EmailSettings,
        transport: Arc<dyn MailTransport>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            settings,
            transport,
            probe,
        }
    }

    async fn deliver(&self, request: &NotificationRequest) -> Result<(), DomainError> {
        let s = &self.settings;
        let attachments = read_attachments(&request.attachments).await;
        let mail = compose(
            &request.subject,
            &s.sender,
            &s.recipient,
            &request.body,
            &attachments,
        )?;

        self.probe.probe(&s.smtp_server, s.smtp_port).await;

        info!(
            server = %s.smtp_server,
            port = s.smtp_port,
            from = %mask_email(&s.sender),
            to = %mask_email(&s.recipient),
            "SMTP send start"
        );

        let mut session = if s.uses_implicit_tls() {
            let session = self
                .transport
                .connect_implicit_tls(&s.smtp_server, s.smtp_port)
                .await?;
            info!("SMTP stage: connected via implicit TLS");
            session
        } else {
            let session = self
                .transport
                .connect_plain(&s.smtp_server, s.smtp_port)
                .await?;
            info!("SMTP stage: connected via plaintext SMTP");
            session
        };

        let result = self.converse(session.as_mut(), &mail).await;
        session.quit().await;
        result
    }

    async fn converse(
        &self,
        session: &mut dyn MailSession,
        mail: &OutgoingMail,
    ) -> Result<(), DomainError> {
        session.greet().await?;
        info!("SMTP stage: EHLO success");

        if !self.settings.uses_implicit_tls() {
            session.starttls().await?;
            info!("SMTP stage: STARTTLS success");
            session.greet().await?;
            info!("SMTP stage: EHLO (after STARTTLS) success");
        }

        session
            .authenticate(&self.settings.sender, &self.settings.password)
            .await?;
        info!("SMTP stage: LOGIN success");

        session.send(mail).await?;
        info!("SMTP stage: SEND success");
        Ok(())
    }
}

#[async_trait::async_trait]
impl NotificationChannel for EmailChannel {
    async fn send(&self, request: &NotificationRequest) -> bool {
        match self.deliver(request).await {
            Ok(()) => {
                info!(subject = %request.subject, "Email sent successfully");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to send email");
                error!(
                    server = %self.settings.smtp_server,
                    port = self.settings.smtp_port,
                    "Email configuration used"
                );
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "email"
    }
}

/// Read attachment files. Unreadable files are left out of the mail.
async fn read_attachments(paths: &[std::path::PathBuf]) -> Vec<MailAttachment> {
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        match tokio::fs::read(path).await {
            Ok(content) => out.push(MailAttachment {
                filename: base_name(path),
                content,
            }),
            Err(e) => {
                let err = DomainError::PartialContent(format!("{}: {}", path.display(), e));
                warn!(error = %err, "attachment skipped");
            }
        }
    }
    out
}

pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Mask the local part of an address for logs: `ab***@domain`.
///
/// Local parts of one or two chars are fully starred; the domain is kept.
pub fn mask_email(address: &str) -> String {
    let Some((local, domain)) = address.split_once('@') else {
        return address.to_string();
    };
    let len = local.chars().count();
    let masked = if len <= 2 {
        "*".repeat(len)
    } else {
        let head: String = local.chars().take(2).collect();
        format!("{}{}", head, "*".repeat(len - 2))
    };
    format!("{}@{}", masked, domain)
}
