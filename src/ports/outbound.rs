//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters (lettre, grammers, inquire) and by the in-memory
//! mocks used for dry runs and tests.

use crate::domain::{DomainError, NotificationRequest, RecipientId, SignInResult};
use std::net::IpAddr;
use std::path::Path;

/// One delivery channel. Never fails outward: problems are logged and reported as `false`.
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, request: &NotificationRequest) -> bool;

    /// Short name for logs ("email", "chat").
    fn name(&self) -> &'static str;
}

/// Authenticated chat session (Telegram user session).
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    /// Check the session is usable, re-establishing it when possible.
    async fn ensure_login(&self) -> bool;

    /// Resolve a display name (or `@username`) to a recipient.
    async fn resolve_recipient(&self, display_name: &str) -> Option<RecipientId>;

    async fn send_message(&self, text: &str, recipient: &RecipientId) -> bool;

    async fn send_file(&self, path: &Path, recipient: &RecipientId) -> bool;
}

/// A composed message ready for the SMTP `MAIL FROM`/`RCPT TO`/`DATA` exchange.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    /// RFC 5322 formatted message.
    pub raw: Vec<u8>,
}

/// Opens SMTP connections.
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    /// TLS handshake as part of connect (SMTPS, usually port 465).
    async fn connect_implicit_tls(
        &self,
        server: &str,
        port: u16,
    ) -> Result<Box<dyn MailSession>, DomainError>;

    /// Plaintext connect; the caller upgrades with `starttls`.
    async fn connect_plain(
        &self,
        server: &str,
        port: u16,
    ) -> Result<Box<dyn MailSession>, DomainError>;
}

/// An open SMTP connection.
#[async_trait::async_trait]
pub trait MailSession: Send {
    /// EHLO.
    async fn greet(&mut self) -> Result<(), DomainError>;

    async fn starttls(&mut self) -> Result<(), DomainError>;

    async fn authenticate(&mut self, username: &str, password: &str) -> Result<(), DomainError>;

    async fn send(&mut self, mail: &OutgoingMail) -> Result<(), DomainError>;

    /// Best effort QUIT.
    async fn quit(&mut self);
}

/// Outcome of a DNS + TCP reachability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub resolved: Result<Vec<IpAddr>, String>,
    /// `None` when DNS failed and no connect was attempted.
    pub tcp: Option<Result<(), String>>,
}

impl ProbeReport {
    pub fn is_reachable(&self) -> bool {
        matches!(self.tcp, Some(Ok(())))
    }
}

/// Diagnostic reachability probe. Never blocks or aborts a send.
#[async_trait::async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self, server: &str, port: u16) -> ProbeReport;
}

/// Interactive login on the chat session.
#[async_trait::async_trait]
pub trait AuthPort: Send + Sync {
    async fn is_authenticated(&self) -> Result<bool, DomainError>;

    async fn request_login_code(&self, phone: &str) -> Result<(), DomainError>;

    async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError>;

    async fn check_password(&self, password: &[u8]) -> Result<(), DomainError>;
}

/// Asks the operator for login input.
pub trait LoginPrompt: Send + Sync {
    fn phone(&self) -> Result<String, DomainError>;

    fn code(&self) -> Result<String, DomainError>;

    fn password(&self, hint: Option<&str>) -> Result<String, DomainError>;
}
