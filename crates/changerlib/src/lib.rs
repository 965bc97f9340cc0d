//! # changerlib -- CD-changer bus protocol engines
//!
//! `changerlib` emulates either side of the proprietary two-wire,
//! clock-less, byte-handshaked bus used between automotive head units and
//! multi-disc CD changers. It is designed for changer emulators (replacing
//! a dead drive with modern media) and for head-unit diagnostics, where
//! byte-exact timing and framing are essential.
//!
//! ## Quick Start
//!
//! Add `changerlib` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! changerlib = { version = "0.1", features = ["m515"] }
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Queue a playback command and tick the master engine:
//!
//! ```no_run
//! use changerlib::m515::{Command, M515Changer};
//! # async fn example<B: changerlib::ChangerBus>(bus: B) -> changerlib::Result<()> {
//! let mut changer = M515Changer::new(bus);
//! changer.request(Command::PlayTrack);
//! loop {
//!     // One tick per scheduler pass; waits are cooperative sleeps.
//!     if changer.poll_transmit().await.is_ok() && !changer.is_pending(Command::PlayTrack) {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                     | Purpose                                      |
//! |---------------------------|----------------------------------------------|
//! | `changerlib-core`         | [`ChangerBus`] trait, status model, events, errors |
//! | `changerlib-m515`         | 34W515-family protocol engine                |
//! | `changerlib-test-harness` | `MockBus` for deterministic engine tests     |
//! | **`changerlib`**          | This facade crate -- re-exports everything   |
//!
//! Engines program against the [`ChangerBus`] trait, so the same protocol
//! logic runs over real GPIO-backed hardware and over the mock bus in
//! tests.
//!
//! ## Roles
//!
//! - **Master** (head unit side): `poll_transmit` services one queued
//!   command per tick, one byte per timing slot, each byte confirmed by
//!   the slave's acknowledgment. `poll_receive` optionally captures and
//!   decodes responses for diagnostics.
//! - **Slave** (emulated changer side): `poll_slave` watches the select
//!   line for the master's high-then-low pulse and answers the handshake.
//!
//! ## Event Subscription
//!
//! Engines emit [`ChangerEvent`]s through a broadcast channel whenever
//! the projected status changes:
//!
//! ```no_run
//! use changerlib::ChangerEvent;
//! # async fn example<B: changerlib::ChangerBus>(changer: changerlib::m515::M515Changer<B>) {
//! let mut events = changer.subscribe();
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         ChangerEvent::DriveStatusChanged { status } => println!("drive: {status}"),
//!         ChangerEvent::PositionChanged { track, minute, second } => {
//!             println!("track {track} {minute:02}:{second:02}")
//!         }
//!         other => println!("{other:?}"),
//!     }
//! }
//! # }
//! ```

pub use changerlib_core::*;

/// 34W515 drive-family protocol engine.
///
/// Provides [`M515Changer`](m515::M515Changer) for both bus roles, the
/// outgoing [`Command`](m515::Command) table, and the frame decoder used
/// by the diagnostic capture path.
#[cfg(feature = "m515")]
pub mod m515 {
    pub use changerlib_m515::*;
}
