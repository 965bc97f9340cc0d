//! The `ChangerBus` trait -- byte-level access to the two-wire changer bus.
//!
//! The bus between a head unit and a CD changer is clock-less: a shared
//! select line signals that a transaction is starting, and bytes are then
//! exchanged bidirectionally with a fixed acknowledgment byte confirming
//! each transfer. This trait abstracts the pin-level side of that exchange
//! (edge reads and bit-level transfer primitives) so the protocol engines
//! can run against real GPIO-backed hardware or against `MockBus` from the
//! `changerlib-test-harness` crate.
//!
//! Timing is deliberately *not* part of this trait. The protocol-mandated
//! waits (inter-byte delay, handshake settle delay, error backoff) are
//! scheduled by the engines themselves via `tokio::time::sleep`, so a
//! multi-tasking host keeps ticking other work while an engine waits.

use async_trait::async_trait;

use crate::error::Result;

/// Asynchronous byte-level access to a changer bus.
///
/// Implementations handle the physical layer only: reading the select line
/// and clocking one byte in each direction. Framing, acknowledgment
/// validation, and retry policy are handled by the protocol engines that
/// consume this trait.
#[async_trait]
pub trait ChangerBus: Send + Sync {
    /// Read the instantaneous level of the shared select line.
    ///
    /// Returns `true` when the line is active (high). The slave engine
    /// watches this line for a high-then-low pulse that signals the master
    /// has a byte ready; the master's capture path treats a low level as
    /// "the peer has a response pending".
    async fn select_level(&mut self) -> Result<bool>;

    /// Exchange one byte with the peer.
    ///
    /// Transfers `out` and returns the byte the peer clocked back in the
    /// same exchange. The call is bounded by the duration of one physical
    /// transfer; a hung bus is governed by the implementation's own
    /// contract, not by this trait.
    async fn transfer_byte(&mut self, out: u8) -> Result<u8>;

    /// Check whether the bus is currently usable.
    fn is_connected(&self) -> bool;
}
