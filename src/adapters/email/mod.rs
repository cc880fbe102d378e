//! Email adapters: MIME composition, SMTP transport (lettre), reachability probe.

pub mod compose;
pub mod probe;
pub mod smtp;

pub use compose::{MailAttachment, compose};
pub use probe::TcpProbe;
pub use smtp::LettreMailTransport;
