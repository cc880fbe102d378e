//! Mock SMTP transport. Records every stage; can be told to fail at one.

use crate::domain::DomainError;
use crate::ports::{MailSession, MailTransport, OutgoingMail};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// One recorded SMTP interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailCall {
    ConnectImplicitTls { server: String, port: u16 },
    ConnectPlain { server: String, port: u16 },
    Greet,
    StartTls,
    Authenticate { username: String },
    Send { from: String, to: Vec<String>, size: usize },
    Quit,
}

/// Stage at which the mock fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Connect,
    StartTls,
    Authenticate,
    Send,
}

#[derive(Debug, Default, Clone)]
pub struct MockMailTransport {
    calls: Arc<Mutex<Vec<MailCall>>>,
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
    fail_at: Option<FailAt>,
}

impl MockMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(stage: FailAt) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::default()
        }
    }

    pub async fn calls(&self) -> Vec<MailCall> {
        self.calls.lock().await.clone()
    }

    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().await.clone()
    }

    async fn open(&self, call: MailCall) -> Result<Box<dyn MailSession>, DomainError> {
        info!(call = ?call, "[MOCK] SMTP connect");
        self.calls.lock().await.push(call);
        if self.fail_at == Some(FailAt::Connect) {
            return Err(DomainError::Transport("connection refused".into()));
        }
        Ok(Box::new(self.clone()))
    }

    async fn record(&self, call: MailCall, stage: FailAt) -> Result<(), DomainError> {
        self.calls.lock().await.push(call);
        if self.fail_at == Some(stage) {
            return Err(match stage {
                FailAt::Authenticate => DomainError::Auth("535 authentication failed".into()),
                _ => DomainError::Transport(format!("{:?} failed", stage)),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MailTransport for MockMailTransport {
    async fn connect_implicit_tls(
        &self,
        server: &str,
        port: u16,
    ) -> Result<Box<dyn MailSession>, DomainError> {
        self.open(MailCall::ConnectImplicitTls {
            server: server.to_string(),
            port,
        })
        .await
    }

    async fn connect_plain(
        &self,
        server: &str,
        port: u16,
    ) -> Result<Box<dyn MailSession>, DomainError> {
        self.open(MailCall::ConnectPlain {
            server: server.to_string(),
            port,
        })
        .await
    }
}

#[async_trait::async_trait]
impl MailSession for MockMailTransport {
    async fn greet(&mut self) -> Result<(), DomainError> {
        self.calls.lock().await.push(MailCall::Greet);
        Ok(())
    }

    async fn starttls(&mut self) -> Result<(), DomainError> {
        self.record(MailCall::StartTls, FailAt::StartTls).await
    }

    async fn authenticate(&mut self, username: &str, _password: &str) -> Result<(), DomainError> {
        self.record(
            MailCall::Authenticate {
                username: username.to_string(),
            },
            FailAt::Authenticate,
        )
        .await
    }

    async fn send(&mut self, mail: &OutgoingMail) -> Result<(), DomainError> {
        self.record(
            MailCall::Send {
                from: mail.from.clone(),
                to: mail.to.clone(),
                size: mail.raw.len(),
            },
            FailAt::Send,
        )
        .await?;
        info!(bytes = mail.raw.len(), "[MOCK] SMTP message accepted");
        self.sent.lock().await.push(mail.clone());
        Ok(())
    }

    async fn quit(&mut self) {
        self.calls.lock().await.push(MailCall::Quit);
    }
}
