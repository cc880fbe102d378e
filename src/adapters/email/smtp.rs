//! Implements MailTransport using lettre's async SMTP connection.
//!
//! Works at the connection level (not `AsyncSmtpTransport`) so every SMTP
//! stage is a separate call the email channel can log and attribute.

use crate::domain::DomainError;
use crate::ports::{MailSession, MailTransport, OutgoingMail};
use async_trait::async_trait;
use lettre::address::{Address, Envelope};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{AsyncSmtpConnection, TlsParameters};
use lettre::transport::smtp::commands::Ehlo;
use lettre::transport::smtp::extension::ClientId;
use std::future::Future;
use std::time::Duration;

const AUTH_MECHANISMS: &[Mechanism] = &[Mechanism::Plain, Mechanism::Login];

/// SMTP transport adapter. Each connect opens a fresh connection.
pub struct LettreMailTransport {
    timeout: Duration,
    hello_name: ClientId,
}

impl LettreMailTransport {
    /// `timeout` bounds every connection operation (connect, handshake, command).
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            hello_name: ClientId::default(),
        }
    }

    async fn connect(
        &self,
        server: &str,
        port: u16,
        tls: Option<TlsParameters>,
    ) -> Result<Box<dyn MailSession>, DomainError> {
        let conn = timed(
            self.timeout,
            "connect",
            AsyncSmtpConnection::connect_tokio1(
                (server.to_string(), port),
                Some(self.timeout),
                &self.hello_name,
                tls,
                None,
            ),
        )
        .await?;
        Ok(Box::new(LettreMailSession {
            conn,
            server: server.to_string(),
            hello_name: self.hello_name.clone(),
            timeout: self.timeout,
        }))
    }
}

#[async_trait]
impl MailTransport for LettreMailTransport {
    async fn connect_implicit_tls(
        &self,
        server: &str,
        port: u16,
    ) -> Result<Box<dyn MailSession>, DomainError> {
        let tls = tls_parameters(server)?;
        self.connect(server, port, Some(tls)).await
    }

    async fn connect_plain(
        &self,
        server: &str,
        port: u16,
    ) -> Result<Box<dyn MailSession>, DomainError> {
        self.connect(server, port, None).await
    }
}

/// One open SMTP connection.
struct LettreMailSession {
    conn: AsyncSmtpConnection,
    server: String,
    hello_name: ClientId,
    timeout: Duration,
}

#[async_trait]
impl MailSession for LettreMailSession {
    async fn greet(&mut self) -> Result<(), DomainError> {
        timed(
            self.timeout,
            "EHLO",
            self.conn.command(Ehlo::new(self.hello_name.clone())),
        )
        .await
        .map(|_response| ())
    }

    async fn starttls(&mut self) -> Result<(), DomainError> {
        let tls = tls_parameters(&self.server)?;
        timed(
            self.timeout,
            "STARTTLS",
            self.conn.starttls(tls, &self.hello_name),
        )
        .await
    }

    async fn authenticate(&mut self, username: &str, password: &str) -> Result<(), DomainError> {
        let credentials = Credentials::new(username.to_string(), password.to_string());
        match tokio::time::timeout(
            self.timeout,
            self.conn.auth(AUTH_MECHANISMS, &credentials),
        )
        .await
        {
            Ok(Ok(_response)) => Ok(()),
            Ok(Err(e)) => Err(DomainError::Auth(e.to_string())),
            Err(_) => Err(timeout_error("AUTH", self.timeout)),
        }
    }

    async fn send(&mut self, mail: &OutgoingMail) -> Result<(), DomainError> {
        let envelope = envelope(mail)?;
        timed(self.timeout, "SEND", self.conn.send(&envelope, &mail.raw))
            .await
            .map(|_response| ())
    }

    async fn quit(&mut self) {
        let _ = tokio::time::timeout(self.timeout, self.conn.quit()).await;
    }
}

fn tls_parameters(server: &str) -> Result<TlsParameters, DomainError> {
    TlsParameters::new(server.to_string())
        .map_err(|e| DomainError::Transport(format!("TLS parameters for {}: {}", server, e)))
}

fn envelope(mail: &OutgoingMail) -> Result<Envelope, DomainError> {
    let from = mail
        .from
        .parse::<Address>()
        .map_err(|e| DomainError::Config(format!("envelope sender: {}", e)))?;
    let to = mail
        .to
        .iter()
        .map(|a| a.parse::<Address>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DomainError::Config(format!("envelope recipient: {}", e)))?;
    Envelope::new(Some(from), to).map_err(|e| DomainError::Config(format!("envelope: {}", e)))
}

/// Run an SMTP operation under `timeout`, mapping failures to `Transport`.
async fn timed<T, F>(timeout: Duration, stage: &str, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, lettre::transport::smtp::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => Err(DomainError::Transport(format!("{}: {}", stage, e))),
        Err(_) => Err(timeout_error(stage, timeout)),
    }
}

fn timeout_error(stage: &str, timeout: Duration) -> DomainError {
    DomainError::Transport(format!("{}: timed out after {:?}", stage, timeout))
}
