//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the CLI into the application
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::NotificationPort;
pub use outbound::{
    AuthPort, ConnectivityProbe, LoginPrompt, MailSession, MailTransport, NotificationChannel,
    OutgoingMail, ProbeReport, SessionProvider,
};
