//! Implements AuthPort over the same grammers Client the session provider uses,
//! so a successful `login` is what later dispatches find in the session file.

use crate::adapters::telegram::mapper::{self, LOGIN_HINT, LoginStage, auth_error};
use crate::domain::{DomainError, SignInResult};
use crate::ports::AuthPort;
use async_trait::async_trait;
use grammers_client::client::{LoginToken, PasswordToken};
use grammers_client::{Client, SignInError};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Where the interactive login currently stands. Each step consumes its token.
enum LoginState {
    Idle,
    AwaitingCode(LoginToken),
    AwaitingPassword(PasswordToken),
}

pub struct GrammersAuthAdapter {
    client: Client,
    api_hash: String,
    state: Mutex<LoginState>,
}

impl GrammersAuthAdapter {
    pub fn new(client: Client, api_hash: impl Into<String>) -> Self {
        Self {
            client,
            api_hash: api_hash.into(),
            state: Mutex::new(LoginState::Idle),
        }
    }
}

#[async_trait]
impl AuthPort for GrammersAuthAdapter {
    async fn is_authenticated(&self) -> Result<bool, DomainError> {
        let check = self.client.is_authorized().await;
        match mapper::unauthorized_reason(check.as_ref().map(|ok| *ok)) {
            None => Ok(true),
            Some(reason) => {
                info!(%reason, "login required");
                check.map_err(|e| auth_error(LoginStage::Check, e))
            }
        }
    }

    async fn request_login_code(&self, phone: &str) -> Result<(), DomainError> {
        let token = self
            .client
            .request_login_code(phone, &self.api_hash)
            .await
            .map_err(|e| auth_error(LoginStage::RequestCode, e))?;
        *self.state.lock().await = LoginState::AwaitingCode(token);
        Ok(())
    }

    async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError> {
        let mut state = self.state.lock().await;
        let LoginState::AwaitingCode(token) = std::mem::replace(&mut *state, LoginState::Idle)
        else {
            return Err(auth_error(LoginStage::SignIn, "no login code was requested"));
        };

        match self.client.sign_in(&token, code).await {
            Ok(_user) => Ok(SignInResult::Success),
            Err(SignInError::PasswordRequired(password_token)) => {
                let hint = password_token.hint().map(String::from);
                *state = LoginState::AwaitingPassword(password_token);
                Ok(SignInResult::PasswordRequired { hint })
            }
            Err(SignInError::InvalidCode) => {
                warn!("login code rejected");
                Err(auth_error(
                    LoginStage::SignIn,
                    format!("invalid login code; {} again", LOGIN_HINT),
                ))
            }
            Err(SignInError::SignUpRequired) => Err(auth_error(
                LoginStage::SignIn,
                "no account for this number; sign up with an official app first",
            )),
            Err(e) => Err(auth_error(LoginStage::SignIn, e)),
        }
    }

    async fn check_password(&self, password: &[u8]) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let LoginState::AwaitingPassword(token) = std::mem::replace(&mut *state, LoginState::Idle)
        else {
            return Err(auth_error(LoginStage::Password, "sign in did not ask for a password"));
        };
        self.client
            .check_password(token, password)
            .await
            .map_err(|e| auth_error(LoginStage::Password, e))?;
        Ok(())
    }
}
