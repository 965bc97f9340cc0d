//! Changer event types.
//!
//! Events are emitted by protocol engines through a `tokio::sync::broadcast`
//! channel whenever the projected status changes. Head-unit display code
//! subscribes to these events for real-time updates without polling the
//! status snapshot. Delivery is best-effort through a bounded channel; slow
//! consumers may miss events during bursts of bus traffic.

use crate::status::{DriveStatus, NameField};

/// An event emitted by a protocol engine when observed changer state changes.
#[derive(Debug, Clone)]
pub enum ChangerEvent {
    /// The drive's playback state changed.
    DriveStatusChanged {
        /// The new playback state.
        status: DriveStatus,
    },

    /// The playback position advanced or jumped.
    PositionChanged {
        /// Track currently playing.
        track: u8,
        /// Minute within the current track.
        minute: u8,
        /// Second within the current track.
        second: u8,
    },

    /// A disc-info response was decoded.
    DiscInfo {
        /// First track number on the disc.
        first_track: u8,
        /// Last track number on the disc.
        last_track: u8,
        /// Total disc play time, whole minutes.
        total_minutes: u8,
    },

    /// A metadata response carried printable text.
    MetadataText {
        /// Which metadata field the text was routed into.
        field: NameField,
        /// The decoded text, already bounded.
        text: String,
    },

    /// A complete response frame was captured and projected.
    FrameCompleted {
        /// Opcode found in the frame's first byte.
        opcode: u8,
        /// Total frame length in bytes.
        len: usize,
    },

    /// A partial frame was discarded after a mid-frame bus error.
    FrameDropped {
        /// Number of buffered bytes that were discarded.
        discarded: usize,
    },
}
