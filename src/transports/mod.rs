//! Transport implementations.
//!
//! Each transport implements the [`Transport`](crate::Transport) trait.
//!
//! | Transport | Feature Flag | Description |
//! |-----------|-------------|-------------|
//! | [`SmtpTransport`] | `smtp` | SMTP via lettre |
//! | [`MemoryTransport`] | (none) | Keeps envelopes in memory for dev/testing |
//! | [`LogTransport`] | (none) | Logs envelopes without delivering |

#[cfg(feature = "smtp")]
mod smtp;
#[cfg(feature = "smtp")]
pub use smtp::SmtpTransport;

mod memory;
pub use memory::{MemoryTransport, StoredEnvelope};

mod log;
pub use self::log::LogTransport;
