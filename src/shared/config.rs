//! Application configuration. Delivery method, channel credentials, tuning.

use crate::domain::{DEFAULT_CHUNK_SIZE, DeliveryMethod, DomainError};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Port that uses implicit TLS instead of a STARTTLS upgrade.
pub const IMPLICIT_TLS_PORT: u16 = 465;
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// email | chat | both. Read from NOTIFY_METHOD.
    #[serde(default)]
    pub method: Option<DeliveryMethod>,

    // ─────────────────────────────────────────────────────────────────────────
    // Email (SMTP)
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub smtp_server: Option<String>,
    #[serde(default)]
    pub smtp_port: Option<u16>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub sender_password: Option<String>,
    #[serde(default)]
    pub recipient_email: Option<String>,
    /// Timeout for SMTP connection operations. Read from NOTIFY_SMTP_TIMEOUT_SECS.
    #[serde(default)]
    pub smtp_timeout_secs: Option<u64>,
    #[serde(default)]
    pub probe_timeout_secs: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Chat (Telegram session)
    // ─────────────────────────────────────────────────────────────────────────
    /// Display name (or @username) of the chat recipient.
    #[serde(default)]
    pub chat_receiver: Option<String>,
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    pub session_path: Option<String>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    /// Delay between chunks (rate limiting). Read from NOTIFY_CHUNK_DELAY_MS.
    #[serde(default)]
    pub chunk_delay_ms: Option<u64>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub retry_delay_secs: Option<u64>,
}

impl AppConfig {
    /// Load from `.env`, `NOTIFY_*` environment variables and the optional
    /// file named by `NOTIFY_CONFIG`.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("NOTIFY_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("NOTIFY"));
        c.build()?.try_deserialize()
    }

    pub fn method_or_default(&self) -> DeliveryMethod {
        self.method.unwrap_or_default()
    }

    pub fn smtp_port_or_default(&self) -> u16 {
        self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS))
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.smtp_timeout_secs.unwrap_or(DEFAULT_SMTP_TIMEOUT_SECS))
    }

    /// Returns the session file path. Defaults to `./session.db`.
    pub fn session_path_or_default(&self) -> PathBuf {
        self.session_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./session.db"))
    }

    /// Validated SMTP settings.
    pub fn email_settings(&self) -> Result<EmailSettings, DomainError> {
        Ok(EmailSettings {
            smtp_server: required(&self.smtp_server, "smtp_server")?,
            smtp_port: self.smtp_port_or_default(),
            sender: required(&self.sender_email, "sender_email")?,
            password: required(&self.sender_password, "sender_password")?,
            recipient: required(&self.recipient_email, "recipient_email")?,
            timeout: self.smtp_timeout(),
        })
    }

    /// Validated chat settings.
    pub fn chat_settings(&self) -> Result<ChatSettings, DomainError> {
        Ok(ChatSettings {
            receiver: required(&self.chat_receiver, "chat_receiver")?,
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            chunk_delay: Duration::from_millis(
                self.chunk_delay_ms.unwrap_or(DEFAULT_CHUNK_DELAY_MS),
            ),
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
            retry_delay: Duration::from_secs(
                self.retry_delay_secs.unwrap_or(DEFAULT_RETRY_DELAY_SECS),
            ),
        })
    }
}

fn required(value: &Option<String>, key: &str) -> Result<String, DomainError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or_else(|| DomainError::Config(format!("{} is not set", key)))
}

/// SMTP server and the single sender/recipient pair.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub recipient: String,
    pub timeout: Duration,
}

impl EmailSettings {
    pub fn uses_implicit_tls(&self) -> bool {
        self.smtp_port == IMPLICIT_TLS_PORT
    }
}

/// Chat recipient plus chunking and retry policy.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub receiver: String,
    pub chunk_size: usize,
    pub chunk_delay: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl ChatSettings {
    pub fn new(receiver: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: Duration::from_millis(DEFAULT_CHUNK_DELAY_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig {
            chat_receiver: Some("Ops Team".into()),
            ..Default::default()
        };
        assert_eq!(cfg.method_or_default(), DeliveryMethod::Email);
        let chat = cfg.chat_settings().unwrap();
        assert_eq!(chat.chunk_size, 2000);
        assert_eq!(chat.chunk_delay, Duration::from_millis(500));
        assert_eq!(chat.max_attempts, 3);
        assert_eq!(chat.retry_delay, Duration::from_secs(5));
        assert_eq!(cfg.smtp_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.probe_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn missing_email_fields_are_config_errors() {
        let cfg = AppConfig {
            smtp_server: Some("smtp.example.com".into()),
            sender_email: Some("bot@example.com".into()),
            sender_password: Some("  ".into()),
            recipient_email: Some("me@example.com".into()),
            ..Default::default()
        };
        let err = cfg.email_settings().unwrap_err();
        assert!(matches!(err, DomainError::Config(ref m) if m.contains("sender_password")));
    }

    #[test]
    fn port_465_means_implicit_tls() {
        let cfg = AppConfig {
            smtp_server: Some("smtp.example.com".into()),
            smtp_port: Some(465),
            sender_email: Some("bot@example.com".into()),
            sender_password: Some("secret".into()),
            recipient_email: Some("me@example.com".into()),
            ..Default::default()
        };
        assert!(cfg.email_settings().unwrap().uses_implicit_tls());
    }

    #[test]
    fn parses_method_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify.toml");
        std::fs::write(
            &path,
            "method = \"both\"\nsmtp_port = 465\nchat_receiver = \"Ops\"\n",
        )
        .unwrap();
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.method_or_default(), DeliveryMethod::Both);
        assert_eq!(cfg.smtp_port_or_default(), 465);
    }

    #[test]
    fn unrecognized_method_keeps_the_rest_of_the_config() {
        let cfg: AppConfig = config::Config::builder()
            .set_override("method", "none")
            .unwrap()
            .set_override("smtp_server", "smtp.example.com")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.method_or_default(), DeliveryMethod::None);
        assert_eq!(cfg.smtp_server.as_deref(), Some("smtp.example.com"));
    }
}
