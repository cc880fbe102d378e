//! Map grammers peers to domain recipients and session failures to diagnostics.

use crate::domain::{DomainError, RecipientId};
use grammers_client::peer::Peer;
use std::fmt;

/// Operator action that fixes an unauthorized session.
pub const LOGIN_HINT: &str = "run `trend-notify login`";

/// Step of the interactive login a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    Check,
    RequestCode,
    SignIn,
    Password,
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoginStage::Check => "session check",
            LoginStage::RequestCode => "login code request",
            LoginStage::SignIn => "sign in",
            LoginStage::Password => "2FA password",
        })
    }
}

/// Auth failure attributed to its login step.
pub fn auth_error(stage: LoginStage, detail: impl fmt::Display) -> DomainError {
    DomainError::Auth(format!("{}: {}", stage, detail))
}

/// Why a session cannot send, or `None` when it is authorized.
pub fn unauthorized_reason<E: fmt::Display>(check: Result<bool, E>) -> Option<String> {
    match check {
        Ok(true) => None,
        Ok(false) => Some(format!("session is not authorized; {}", LOGIN_HINT)),
        Err(e) => Some(format!("{} failed: {}; {}", LoginStage::Check, e, LOGIN_HINT)),
    }
}

/// Whether `query` names this peer: display name or `@username`, case-insensitive.
pub fn peer_matches(peer: &Peer, query: &str) -> bool {
    names_match(peer.name(), peer.username(), query)
}

/// Build the domain recipient for a matched peer.
pub fn recipient_from_peer(peer: &Peer, query: &str) -> RecipientId {
    RecipientId {
        id: peer.id().bot_api_dialog_id_unchecked(),
        display_name: peer.name().map(String::from).unwrap_or_else(|| query.to_string()),
    }
}

fn names_match(name: Option<&str>, username: Option<&str>, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }
    if let Some(handle) = query.strip_prefix('@') {
        return username.is_some_and(|u| u.eq_ignore_ascii_case(handle));
    }
    name.is_some_and(|n| n.trim().eq_ignore_ascii_case(query))
        || username.is_some_and(|u| u.eq_ignore_ascii_case(query))
}
