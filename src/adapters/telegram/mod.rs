//! Telegram adapters (grammers): session provider, login, session file.

pub mod auth_adapter;
pub mod client;
pub mod mapper;
pub mod session;

pub use auth_adapter::GrammersAuthAdapter;
pub use client::GrammersSessionProvider;
pub use session::connect_client;
