//! The outgoing command table.
//!
//! Every command the head unit can send to the drive is listed here with
//! its fixed payload. Table order is priority order: when several requests
//! are pending at once, the transmit engine services the lowest-index one
//! and leaves the rest queued for later ticks.
//!
//! Request flags follow a strict single-producer/single-consumer contract:
//! [`CommandFlags::request`] is the only place a flag goes `true`, and the
//! transmit engine's success path is the only place it goes `false`.

use crate::protocol::*;

/// An outgoing command, in priority order (lower = serviced first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Command {
    /// The four-byte power-up init frame.
    Init = 0,
    /// Eject the current disc.
    EjectDisc,
    /// Stop playback.
    StopTrack,
    /// Pause playback.
    PauseTrack,
    /// Start or resume playback.
    PlayTrack,
    /// Skip to the next track.
    NextTrack,
    /// Skip to the previous track.
    PreviousTrack,
    /// Fast-forward within the current track.
    FastForward,
    /// Rewind within the current track.
    Rewind,
    /// Request disc info (track count, total time).
    DiscInfo,
    /// Request the disc-structure response.
    DiscStructure,
    /// Request the folder-structure (error info) response.
    FolderStructure,
    /// Enable random playback.
    RandomEnable,
    /// Disable random playback.
    RandomDisable,
}

/// Number of entries in the command table.
pub const COMMAND_COUNT: usize = 14;

/// All commands in priority order.
pub const COMMANDS: [Command; COMMAND_COUNT] = [
    Command::Init,
    Command::EjectDisc,
    Command::StopTrack,
    Command::PauseTrack,
    Command::PlayTrack,
    Command::NextTrack,
    Command::PreviousTrack,
    Command::FastForward,
    Command::Rewind,
    Command::DiscInfo,
    Command::DiscStructure,
    Command::FolderStructure,
    Command::RandomEnable,
    Command::RandomDisable,
];

impl Command {
    /// The byte sequence transmitted for this command.
    pub fn payload(&self) -> &'static [u8] {
        match self {
            Command::Init => &INIT_FRAME,
            Command::EjectDisc => &[REQ_EJECT],
            Command::StopTrack => &[REQ_STOP],
            Command::PauseTrack => &[REQ_PAUSE],
            Command::PlayTrack => &[REQ_PLAY],
            Command::NextTrack => &[REQ_GOTO_TRACK, GOTO_NEXT],
            Command::PreviousTrack => &[REQ_GOTO_TRACK, GOTO_PREVIOUS],
            Command::FastForward => &[REQ_FAST_FORWARD],
            Command::Rewind => &[REQ_REWIND],
            Command::DiscInfo => &[REQ_DISC_INFO],
            Command::DiscStructure => &[REQ_DISC_STRUCTURE],
            Command::FolderStructure => &[REQ_FOLDER_STRUCTURE],
            Command::RandomEnable => &[REQ_RANDOM_ENABLE],
            Command::RandomDisable => &[REQ_RANDOM_DISABLE],
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Owned request flags for the whole command table.
///
/// Callers request work by command identifier; only the transmit engine
/// clears, and only after a fully acknowledged payload.
#[derive(Debug, Default)]
pub struct CommandFlags {
    flags: [bool; COMMAND_COUNT],
}

impl CommandFlags {
    /// Create a table with no requests pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a command as requested. Idempotent while pending.
    pub fn request(&mut self, cmd: Command) {
        self.flags[cmd.index()] = true;
    }

    /// Whether a command is currently pending.
    pub fn is_pending(&self, cmd: Command) -> bool {
        self.flags[cmd.index()]
    }

    /// The highest-priority pending command, if any.
    pub fn first_pending(&self) -> Option<Command> {
        COMMANDS.iter().copied().find(|c| self.flags[c.index()])
    }

    /// Clear a command's request flag. Called only by the transmit engine
    /// after the final payload byte has been acknowledged.
    pub(crate) fn clear(&mut self, cmd: Command) {
        self.flags[cmd.index()] = false;
    }
}
