//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Channels never let them
//! escape: they are logged and collapsed into a `false` delivery outcome.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Missing or invalid recipient, sender or credentials.
    #[error("Configuration error: {0}")]
    Config(String),

    /// DNS, TCP, TLS or SMTP protocol failure.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Chat session not authenticated, recipient unresolved or an RPC failed.
    #[error("Chat session error: {0}")]
    Session(String),

    /// Attachment or report could not be read. Callers degrade by omitting it.
    #[error("Partial content: {0}")]
    PartialContent(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}
