//! Implements LoginPrompt. Inquire-based interactive prompts.

use crate::domain::DomainError;
use crate::ports::LoginPrompt;
use inquire::{Password, PasswordDisplayMode, Text};

/// Terminal prompts for the `login` command.
#[derive(Debug, Default)]
pub struct InquireLoginPrompt;

impl InquireLoginPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl LoginPrompt for InquireLoginPrompt {
    fn phone(&self) -> Result<String, DomainError> {
        Text::new("Phone number (international format):")
            .prompt()
            .map_err(|e| DomainError::Prompt(e.to_string()))
    }

    fn code(&self) -> Result<String, DomainError> {
        Text::new("Login code sent by Telegram:")
            .prompt()
            .map_err(|e| DomainError::Prompt(e.to_string()))
    }

    fn password(&self, hint: Option<&str>) -> Result<String, DomainError> {
        let message = match hint {
            Some(h) => format!("2FA password (hint: {}):", h),
            None => "2FA password:".to_string(),
        };
        Password::new(&message)
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .map_err(|e| DomainError::Prompt(e.to_string()))
    }
}
