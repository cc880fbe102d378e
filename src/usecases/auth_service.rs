//! Interactive chat login: phone -> code -> 2FA password when required.
//!
//! Run once by the `login` command; dispatch only checks the stored session.

use crate::domain::{DomainError, SignInResult};
use crate::ports::{AuthPort, LoginPrompt};
use std::sync::Arc;
use tracing::info;

pub struct AuthService {
    auth: Arc<dyn AuthPort>,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthPort>) -> Self {
        Self { auth }
    }

    pub async fn is_authenticated(&self) -> Result<bool, DomainError> {
        self.auth.is_authenticated().await
    }

    /// Run the full flow unless the session is already authorized.
    pub async fn run_auth_flow(&self, prompt: &dyn LoginPrompt) -> Result<(), DomainError> {
        if self.auth.is_authenticated().await? {
            info!("chat session already authorized");
            return Ok(());
        }

        let phone = prompt.phone()?;
        self.auth.request_login_code(phone.trim()).await?;
        info!("login code requested");

        let code = prompt.code()?;
        match self.auth.sign_in(code.trim()).await? {
            SignInResult::Success => {}
            SignInResult::PasswordRequired { hint } => {
                let password = prompt.password(hint.as_deref())?;
                self.auth.check_password(password.as_bytes()).await?;
            }
        }
        info!("chat session authorized");
        Ok(())
    }
}
