//! In-memory adapters for dry runs and tests.
//!
//! Nothing leaves the process; every call is logged and recorded so tests
//! can assert on the exact interaction sequence.

pub mod mock_mail;
pub mod mock_probe;
pub mod mock_session;

pub use mock_mail::{FailAt, MailCall, MockMailTransport};
pub use mock_probe::MockProbe;
pub use mock_session::{MockSessionProvider, SessionCall};
