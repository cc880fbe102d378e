//! Core domain layer. No external I/O dependencies.
//!
//! Entities, errors and the pure text algorithms (formatting, chunking)
//! live here. Dependencies flow inward.

pub mod chunker;
pub mod entities;
pub mod errors;
pub mod formatter;
pub mod trend;

pub use chunker::{DEFAULT_CHUNK_SIZE, split_into_chunks};
pub use entities::{
    DeliveryMethod, FormattedMessage, NotificationRequest, RecipientId, ReportRow, SignInResult,
    TabularReport, TrendType,
};
pub use errors::DomainError;
pub use formatter::{format_for_chat, html_to_text};
