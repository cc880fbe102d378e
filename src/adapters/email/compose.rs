//! Builds the multipart message: HTML body plus one part per attachment.

use crate::domain::DomainError;
use crate::ports::OutgoingMail;
use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};

/// File content attached to an email, named by its base name.
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Compose `multipart/mixed` mail from `from` to `to`.
pub fn compose(
    subject: &str,
    from: &str,
    to: &str,
    html_body: &str,
    attachments: &[MailAttachment],
) -> Result<OutgoingMail, DomainError> {
    let from_mailbox = parse_mailbox(from, "sender")?;
    let to_mailbox = parse_mailbox(to, "recipient")?;
    let octet_stream = ContentType::parse("application/octet-stream")
        .map_err(|e| DomainError::Config(format!("content type: {}", e)))?;

    let mut body = MultiPart::mixed().singlepart(SinglePart::html(html_body.to_string()));
    for attachment in attachments {
        body = body.singlepart(
            Attachment::new(attachment.filename.clone())
                .body(attachment.content.clone(), octet_stream.clone()),
        );
    }

    let message = Message::builder()
        .from(from_mailbox)
        .to(to_mailbox)
        .subject(subject)
        .multipart(body)
        .map_err(|e| DomainError::Config(format!("build email: {}", e)))?;

    let envelope = message.envelope();
    Ok(OutgoingMail {
        from: envelope
            .from()
            .map(ToString::to_string)
            .unwrap_or_default(),
        to: envelope.to().iter().map(ToString::to_string).collect(),
        raw: message.formatted(),
    })
}

fn parse_mailbox(value: &str, role: &str) -> Result<Mailbox, DomainError> {
    value
        .parse::<Mailbox>()
        .map_err(|e| DomainError::Config(format!("invalid {} address: {}", role, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_html_body_and_named_attachments() {
        let mail = compose(
            "Weekly trends",
            "bot@example.com",
            "me@example.com",
            "<h1>Hi</h1>",
            &[MailAttachment {
                filename: "chart.png".into(),
                content: vec![1, 2, 3],
            }],
        )
        .unwrap();
        assert_eq!(mail.from, "bot@example.com");
        assert_eq!(mail.to, vec!["me@example.com".to_string()]);
        let raw = String::from_utf8_lossy(&mail.raw);
        assert!(raw.contains("Subject: Weekly trends"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("filename=\"chart.png\""));
        assert!(raw.contains("application/octet-stream"));
    }

    #[test]
    fn rejects_invalid_sender() {
        let err = compose("s", "not-an-address", "me@example.com", "b", &[]).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }
}
