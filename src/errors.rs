//! Crate-specific error and result types.
//!
//! Almost nothing in the synthesis core can fail: malformed reports decode to
//! a pass-through sentinel, a missing receiver window drops the message, and
//! an unreadable hotkey setting falls back to a default scheme. The errors
//! that remain are the fatal startup class - failing to register the keyboard
//! raw input capability with the host - which callers are expected to report
//! and exit on.

use ::thiserror::Error;

/// Result type returned by fallible operations in this crate.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Error type for the few operations that can genuinely fail.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The host refused to register the keyboard device class for raw input
    /// delivery. Fatal at startup: without the registration no reports ever
    /// arrive.
    #[error("failed to register keyboard for raw input delivery: {reason}")]
    DeviceRegistration {
        /// Host-provided description of the failure.
        reason: String,
    },

    /// The host refused to remove an existing raw input registration during
    /// teardown.
    #[error("failed to remove keyboard raw input registration: {reason}")]
    DeviceUnregistration {
        /// Host-provided description of the failure.
        reason: String,
    },
}
