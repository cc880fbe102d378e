//! Application use cases. Orchestrate domain logic via ports.

pub mod auth_service;
pub mod chat_channel;
pub mod email_channel;
pub mod notification_manager;

pub use auth_service::AuthService;
pub use chat_channel::ChatChannel;
pub use email_channel::{EmailChannel, mask_email};
pub use notification_manager::NotificationManager;
