//! Report adapter. Reads the trends CSV attached to a notification.

pub mod csv_report;

pub use csv_report::{parse_report, read_report};
