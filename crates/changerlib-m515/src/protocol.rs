//! 34W515 wire vocabulary: opcodes, handshake bytes, timing, and framing.
//!
//! The 34W515 bus is a two-wire, clock-less, byte-handshaked link. Every
//! transferred byte is answered by a fixed acknowledgment byte from the
//! receiving side, and frames carry neither a checksum nor a length prefix:
//! the receiver must infer where a response frame ends from its opcode and,
//! for two opcode classes, from its accumulated content. That inference
//! table lives here alongside the raw byte values.
//!
//! # Frame format
//!
//! ```text
//! <opcode> <content...>
//! ```
//!
//! - `opcode`: one byte identifying the command or response type.
//! - `content`: zero or more bytes whose count is fixed per opcode, or
//!   determined by the content rules in [`FrameClass`].
//!
//! Bytes are exchanged one per timing slot with [`INTER_BYTE_DELAY`]
//! between consecutive bytes of a frame; the slave needs that gap for
//! processing. There is no recovery from desynchronization beyond the
//! retry/backoff behavior of the engines.

use std::time::Duration;

use changerlib_core::DriveStatus;

// ---------------------------------------------------------------
// Handshake and timing
// ---------------------------------------------------------------

/// Acknowledgment byte sent by the master side of an exchange.
pub const MASTER_ACK: u8 = 0xDB;

/// Acknowledgment byte sent by the slave side of an exchange.
pub const SLAVE_ACK: u8 = 0x5A;

/// Required gap between consecutive bytes of one frame.
pub const INTER_BYTE_DELAY: Duration = Duration::from_millis(2);

/// Backoff after a failed or unacknowledged byte transfer.
pub const ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Settle time between detecting the master's select pulse and answering
/// the handshake.
pub const HANDSHAKE_SETTLE: Duration = Duration::from_micros(40);

// ---------------------------------------------------------------
// Master -> slave request opcodes
// ---------------------------------------------------------------

/// Eject the current disc.
pub const REQ_EJECT: u8 = 0xE1;
/// Stop playback.
pub const REQ_STOP: u8 = 0xE2;
/// Start or resume playback. Also disables scan mode.
pub const REQ_PLAY: u8 = 0xE4;
/// Enable scan (intro) playback.
pub const REQ_SCAN_ENABLE: u8 = 0xE5;
/// Fast-forward within the current track.
pub const REQ_FAST_FORWARD: u8 = 0xE6;
/// Rewind within the current track.
pub const REQ_REWIND: u8 = 0xE7;
/// Enable random (shuffle) playback.
pub const REQ_RANDOM_ENABLE: u8 = 0xEA;
/// Pause playback.
pub const REQ_PAUSE: u8 = 0xEC;
/// First byte of the two-byte goto-track frame `{0xF4, track}`.
pub const REQ_GOTO_TRACK: u8 = 0xF4;
/// Request the error-info (folder structure) response.
pub const REQ_FOLDER_STRUCTURE: u8 = 0xF7;
/// Request the disc-structure (track info) response.
pub const REQ_DISC_STRUCTURE: u8 = 0xF8;
/// Disable random (shuffle) playback.
pub const REQ_RANDOM_DISABLE: u8 = 0xFA;
/// Request the disc-info response.
pub const REQ_DISC_INFO: u8 = 0xFC;

/// The four-byte init frame sent once after power-up. Its purpose is not
/// documented by the drive vendor; the head unit sends it verbatim.
pub const INIT_FRAME: [u8; 4] = [0x5F, 0x50, 0xFE, 0x3B];

/// Track argument of the goto-track frame meaning "next track".
pub const GOTO_NEXT: u8 = 3;
/// Track argument of the goto-track frame meaning "previous track".
pub const GOTO_PREVIOUS: u8 = 2;

// ---------------------------------------------------------------
// Slave -> master response opcodes
// ---------------------------------------------------------------

/// Status: disc present, playback stopped.
pub const ST_STOPPED: u8 = 0x72;
/// Status: disc inserted, being identified.
pub const ST_LOADING: u8 = 0x74;
/// Status: no disc in the selected slot.
pub const ST_NO_CD: u8 = 0x61;
/// Status: playing.
pub const ST_PLAYING: u8 = 0x64;
/// Status: paused (first form).
pub const ST_PAUSED_1: u8 = 0x7C;
/// Status: paused (second form).
pub const ST_PAUSED_2: u8 = 0x6C;
/// Acknowledgment of a state-change request.
pub const ST_STATE_CHANGE: u8 = 0x7A;
/// Fast-forward acknowledged (first form).
pub const ST_FAST_FORWARD_1: u8 = 0x76;
/// Fast-forward acknowledged (second form).
pub const ST_FAST_FORWARD_2: u8 = 0x66;
/// Rewind acknowledged (first form).
pub const ST_REWIND_1: u8 = 0x77;
/// Rewind acknowledged (second form).
pub const ST_REWIND_2: u8 = 0x67;
/// Eject acknowledged.
pub const ST_EJECT: u8 = 0x71;

/// Disc-info response opcode. The frame is always
/// `{0x6E, first_track, track_count, total_time, 0x01, 0x01}`.
pub const RSP_DISC_INFO: u8 = 0x6E;
/// Metadata (text) response opcode.
pub const RSP_METADATA: u8 = 0x69;
/// First init acknowledgment frame opcode.
pub const RSP_INIT_1: u8 = 0x5F;
/// Second init acknowledgment frame opcode.
pub const RSP_INIT_2: u8 = 0x50;
/// Disc-structure response opcode.
pub const RSP_DISC_STRUCTURE: u8 = 0x78;
/// Error-info response opcode.
pub const RSP_ERROR_INFO: u8 = 0x7E;

// ---------------------------------------------------------------
// Frame layout within responses
// ---------------------------------------------------------------

/// Index of the status byte within a status-class frame.
pub const STATUS_BYTE_IDX: usize = 1;
/// Index of the disc-identifier byte within a fixed-size status frame.
pub const CDID_IDX: usize = 2;
/// Index of the current track within a fixed-size status frame.
pub const TRACK_IDX: usize = 3;
/// Index of the current minute within a fixed-size status frame.
pub const MINUTE_IDX: usize = 4;
/// Index of the current second within a fixed-size status frame.
pub const SECOND_IDX: usize = 5;
/// Index of the playback-flags byte within a fixed-size status frame.
pub const FLAGS_IDX: usize = 6;

/// High-nibble status bits meaning "a CD is loaded".
pub const STATUS_CD_LOADED: u8 = 0x60;
/// Low-nibble status bits meaning "playing".
pub const STATUS_PLAYING_BITS: u8 = 0x04;
/// Flags-byte bit meaning random (shuffle) playback is active.
pub const FLAG_RANDOM: u8 = 0x01;

/// Disc-identifier value for a plain audio CD. Any other value is an MP3
/// data disc.
pub const CDID_AUDIO_CD: u8 = 0x01;

/// End-of-frame marker for variable-length status frames. Two in a row
/// terminate the frame.
pub const STATUS_END_MARK: u8 = 0xCC;

/// Index of the "data exists" marker within a metadata frame.
pub const METADATA_MARK_IDX: usize = 1;
/// Marker value meaning the metadata frame carries text.
pub const METADATA_EXISTS: u8 = 0x10;
/// Index of the first text byte within a metadata frame.
pub const METADATA_TEXT_IDX: usize = 9;

// ---------------------------------------------------------------
// Frame lengths
// ---------------------------------------------------------------

/// Upper bound on any response frame, and the working length of a
/// variable-length status frame before its terminator is found.
pub const MAX_FRAME_LEN: usize = 32;

/// Fixed length of the disc-info response.
pub const SIZE_DISC_INFO: usize = 6;
/// Fixed length of the first init acknowledgment.
pub const SIZE_INIT_1: usize = 4;
/// Fixed length of the second init acknowledgment.
pub const SIZE_INIT_2: usize = 8;
/// Fixed length of the disc-structure response.
pub const SIZE_DISC_STRUCTURE: usize = 10;
/// Fixed length of the error-info response.
pub const SIZE_ERROR_INFO: usize = 4;
/// Fixed length of a status frame for an audio CD while playing.
pub const SIZE_STATUS_AUDIO: usize = 10;
/// Fixed length of a status frame for an MP3 disc while playing.
pub const SIZE_STATUS_MP3: usize = 12;
/// Fixed length of a metadata frame with no text available.
pub const SIZE_METADATA_NONE: usize = 4;
/// Fixed length of a metadata frame carrying text.
pub const SIZE_METADATA_TEXT: usize = 22;

// ---------------------------------------------------------------
// Frame classification
// ---------------------------------------------------------------

/// How the length of a response frame is determined, keyed by its opcode.
///
/// Most frames have fixed lengths known a priori. Two classes do not:
/// status frames end with a doubled [`STATUS_END_MARK`] unless the drive
/// is playing (then one of two fixed lengths applies, selected by the
/// disc-identifier byte), and metadata frames are short or long depending
/// on the "data exists" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    /// Drive status family: length inferred from content.
    Status,
    /// Disc-info: fixed [`SIZE_DISC_INFO`].
    DiscInfo,
    /// Metadata text: short or long fixed length, chosen by content.
    Metadata,
    /// First init acknowledgment: fixed [`SIZE_INIT_1`].
    InitAck1,
    /// Second init acknowledgment: fixed [`SIZE_INIT_2`].
    InitAck2,
    /// Disc structure: fixed [`SIZE_DISC_STRUCTURE`].
    DiscStructure,
    /// Error info: fixed [`SIZE_ERROR_INFO`].
    ErrorInfo,
    /// Not part of the known vocabulary.
    Unknown,
}

impl FrameClass {
    /// Classify a response frame by its first byte.
    pub fn of(opcode: u8) -> FrameClass {
        match opcode {
            ST_STOPPED | ST_LOADING | ST_NO_CD | ST_PLAYING | ST_PAUSED_1 | ST_PAUSED_2
            | ST_STATE_CHANGE | ST_FAST_FORWARD_1 | ST_FAST_FORWARD_2 | ST_REWIND_1
            | ST_REWIND_2 | ST_EJECT => FrameClass::Status,
            RSP_DISC_INFO => FrameClass::DiscInfo,
            RSP_METADATA => FrameClass::Metadata,
            RSP_INIT_1 => FrameClass::InitAck1,
            RSP_INIT_2 => FrameClass::InitAck2,
            RSP_DISC_STRUCTURE => FrameClass::DiscStructure,
            RSP_ERROR_INFO => FrameClass::ErrorInfo,
            _ => FrameClass::Unknown,
        }
    }
}

/// Map a status-family opcode to the drive state it announces.
///
/// Returns `None` for opcodes outside the status family.
pub fn drive_status_for(opcode: u8) -> Option<DriveStatus> {
    match opcode {
        ST_STOPPED => Some(DriveStatus::Stopped),
        ST_LOADING => Some(DriveStatus::Detecting),
        ST_NO_CD => Some(DriveStatus::NoCd),
        ST_PLAYING => Some(DriveStatus::Playing),
        ST_PAUSED_1 | ST_PAUSED_2 => Some(DriveStatus::Paused),
        ST_FAST_FORWARD_1 | ST_FAST_FORWARD_2 => Some(DriveStatus::FastForward),
        ST_REWIND_1 | ST_REWIND_2 => Some(DriveStatus::Rewind),
        ST_STATE_CHANGE | ST_EJECT => Some(DriveStatus::Busy),
        _ => None,
    }
}
