//! Terminal UI adapters.

pub mod tui;

pub use tui::InquireLoginPrompt;
