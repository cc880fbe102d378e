//! Adapters. Implement ports (email, chat, report parsing, prompts, mocks).

pub mod email;
pub mod mock;
pub mod report;
pub mod telegram;
pub mod ui;
