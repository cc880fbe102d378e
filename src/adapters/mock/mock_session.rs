//! Mock chat session. Knows a fixed set of contacts and records what is sent.

use crate::domain::RecipientId;
use crate::ports::SessionProvider;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::info;

/// One recorded session interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    EnsureLogin,
    Resolve(String),
    Message(String),
    File(PathBuf),
}

/// In-memory session provider.
///
/// `login_failures` initial `ensure_login` calls fail; `usize::MAX` means
/// the session never comes up.
#[derive(Debug)]
pub struct MockSessionProvider {
    contacts: Vec<String>,
    login_failures: AtomicUsize,
    /// Fail the message send with this (0-based) index.
    fail_message_at: Option<usize>,
    fail_files: bool,
    messages_sent: AtomicUsize,
    calls: Mutex<Vec<SessionCall>>,
}

impl MockSessionProvider {
    pub fn new<I, S>(contacts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            contacts: contacts.into_iter().map(Into::into).collect(),
            login_failures: AtomicUsize::new(0),
            fail_message_at: None,
            fail_files: false,
            messages_sent: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_login_failures(self, count: usize) -> Self {
        self.login_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_message_failure_at(mut self, index: usize) -> Self {
        self.fail_message_at = Some(index);
        self
    }

    pub fn with_file_failures(mut self) -> Self {
        self.fail_files = true;
        self
    }

    pub async fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().await.clone()
    }

    /// Texts delivered, in order.
    pub async fn messages(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                SessionCall::Message(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn login_attempts(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| matches!(c, SessionCall::EnsureLogin))
            .count()
    }
}

#[async_trait::async_trait]
impl SessionProvider for MockSessionProvider {
    async fn ensure_login(&self) -> bool {
        self.calls.lock().await.push(SessionCall::EnsureLogin);
        let remaining = self.login_failures.load(Ordering::SeqCst);
        if remaining == 0 {
            return true;
        }
        if remaining != usize::MAX {
            self.login_failures.store(remaining - 1, Ordering::SeqCst);
        }
        info!(remaining, "[MOCK] session login refused");
        false
    }

    async fn resolve_recipient(&self, display_name: &str) -> Option<RecipientId> {
        self.calls
            .lock()
            .await
            .push(SessionCall::Resolve(display_name.to_string()));
        self.contacts
            .iter()
            .position(|c| c == display_name)
            .map(|i| RecipientId {
                id: i as i64 + 1,
                display_name: display_name.to_string(),
            })
    }

    async fn send_message(&self, text: &str, recipient: &RecipientId) -> bool {
        let index = self.messages_sent.fetch_add(1, Ordering::SeqCst);
        if self.fail_message_at == Some(index) {
            info!(index, "[MOCK] message send refused");
            return false;
        }
        info!(to = %recipient.display_name, chars = text.chars().count(), "[MOCK] chat message");
        self.calls
            .lock()
            .await
            .push(SessionCall::Message(text.to_string()));
        true
    }

    async fn send_file(&self, path: &Path, recipient: &RecipientId) -> bool {
        if self.fail_files {
            return false;
        }
        info!(to = %recipient.display_name, path = %path.display(), "[MOCK] chat file");
        self.calls
            .lock()
            .await
            .push(SessionCall::File(path.to_path_buf()));
        true
    }
}
