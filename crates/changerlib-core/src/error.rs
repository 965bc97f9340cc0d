//! Error types for changerlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Bus-level and protocol-level failures
//! are all captured here.
//!
//! The protocol engines treat every error as transient: a failed command
//! payload stays queued and is retried wholesale on a later tick, and a
//! failed frame capture discards the partial buffer and resynchronizes on
//! the next byte boundary. No error is ever escalated to a fatal condition.

/// The error type for all changerlib operations.
///
/// Variants cover the failure modes of a clock-less, byte-handshaked bus:
/// physical exchange failures, bad acknowledgments, and discarded
/// partial frames.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A bus-level error (byte exchange failed at the physical layer).
    #[error("bus transport error: {0}")]
    Transport(String),

    /// A protocol-level error (unexpected data on the bus).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The peer returned the wrong acknowledgment byte for a transferred byte.
    ///
    /// The command payload being sent is aborted and retried from its first
    /// byte on a later tick; the request flag stays set.
    #[error("byte 0x{sent:02X} not acknowledged: peer returned 0x{got:02X}")]
    Nak {
        /// The byte that was transferred.
        sent: u8,
        /// The acknowledgment byte the peer actually returned.
        got: u8,
    },

    /// A bus error occurred mid-frame; the partial response was discarded.
    ///
    /// The next byte received on the bus is treated as the start of a new
    /// frame. No partial frame content reaches the status model.
    #[error("frame reset: partial response discarded")]
    FrameReset,

    /// No connection to the bus has been established.
    #[error("not connected")]
    NotConnected,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
