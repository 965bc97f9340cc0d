//! The generic disc-status model.
//!
//! [`ChangerStatus`] is the role-agnostic view of the changer that the rest
//! of the system consumes: playback state, disc geometry, current position,
//! and bounded metadata text. It is owned by a protocol engine and mutated
//! *only* by that engine's status projection after a complete response
//! frame has been decoded -- no partial-frame content is ever visible here.
//! Consumers read cloned snapshots.

use std::fmt;

/// Maximum stored length of a metadata text field, in bytes.
///
/// Frames carry at most this much printable text per metadata response;
/// anything longer is truncated at a character boundary.
pub const MAX_NAME_LEN: usize = 16;

/// Playback state of the changer drive.
///
/// Exactly one value holds at any instant. Mutated only by status
/// projection when a recognized status opcode arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriveStatus {
    /// No disc in the selected slot.
    #[default]
    NoCd,
    /// A disc is inserted and being identified.
    Detecting,
    /// Disc present, playback stopped.
    Stopped,
    /// The drive is working on a state change (seek, load, eject).
    Busy,
    /// Playing audio.
    Playing,
    /// Playback paused.
    Paused,
    /// Fast-forwarding within the current track.
    FastForward,
    /// Rewinding within the current track.
    Rewind,
}

impl fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DriveStatus::NoCd => "NO-CD",
            DriveStatus::Detecting => "DETECTING",
            DriveStatus::Stopped => "STOPPED",
            DriveStatus::Busy => "BUSY",
            DriveStatus::Playing => "PLAYING",
            DriveStatus::Paused => "PAUSED",
            DriveStatus::FastForward => "FAST-FORWARD",
            DriveStatus::Rewind => "REWIND",
        };
        write!(f, "{s}")
    }
}

/// Which metadata text field a metadata response is routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NameField {
    /// Current track title.
    #[default]
    Track,
    /// Current artist name.
    Artist,
    /// Current folder (directory) name on an MP3 disc.
    Folder,
    /// Current file name on an MP3 disc.
    File,
}

impl fmt::Display for NameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NameField::Track => "track",
            NameField::Artist => "artist",
            NameField::Folder => "folder",
            NameField::File => "file",
        };
        write!(f, "{s}")
    }
}

/// Aggregate status of the changer as observed on the bus.
///
/// A protocol engine owns one instance and exposes read-only snapshots.
/// Every field is written with the absolute value carried by the frame
/// being projected, never incrementally, so projecting the same frame
/// twice yields the same status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangerStatus {
    /// First folder number on the disc (MP3 discs; 0 when unknown).
    pub first_folder: u8,
    /// Last folder number on the disc.
    pub last_folder: u8,
    /// Total folder count on the disc.
    pub total_folders: u8,

    /// First track number on the disc.
    pub first_track: u8,
    /// Last track number on the disc.
    pub last_track: u8,
    /// Total track count on the disc.
    pub total_tracks: u8,
    /// Total file count on the disc (MP3 discs).
    pub total_files: u8,
    /// Total disc play time, whole minutes.
    pub total_minutes: u8,

    /// Folder currently playing (MP3 discs).
    pub current_folder: u8,
    /// Track currently playing.
    pub current_track: u8,
    /// Minute within the current track.
    pub current_minute: u8,
    /// Second within the current track.
    pub current_second: u8,

    /// Current track title, bounded by [`MAX_NAME_LEN`].
    pub track_name: String,
    /// Current artist name, bounded by [`MAX_NAME_LEN`].
    pub artist_name: String,
    /// Current folder name, bounded by [`MAX_NAME_LEN`].
    pub folder_name: String,
    /// Current file name, bounded by [`MAX_NAME_LEN`].
    pub file_name: String,

    /// Playback state of the drive.
    pub drive_status: DriveStatus,
    /// Whether the loaded disc is an MP3 data disc rather than an audio CD.
    pub is_mp3_disc: bool,
    /// Whether random (shuffle) playback is enabled.
    pub is_random_enabled: bool,
}

impl ChangerStatus {
    /// Write `text` into the metadata field selected by `field`, truncating
    /// to [`MAX_NAME_LEN`] bytes.
    pub fn set_name(&mut self, field: NameField, text: &str) {
        let bounded: String = text.chars().take(MAX_NAME_LEN).collect();
        match field {
            NameField::Track => self.track_name = bounded,
            NameField::Artist => self.artist_name = bounded,
            NameField::Folder => self.folder_name = bounded,
            NameField::File => self.file_name = bounded,
        }
    }

    /// Read the metadata field selected by `field`.
    pub fn name(&self, field: NameField) -> &str {
        match field {
            NameField::Track => &self.track_name,
            NameField::Artist => &self.artist_name,
            NameField::Folder => &self.folder_name,
            NameField::File => &self.file_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_status_default_is_no_cd() {
        assert_eq!(DriveStatus::default(), DriveStatus::NoCd);
        assert_eq!(ChangerStatus::default().drive_status, DriveStatus::NoCd);
    }

    #[test]
    fn drive_status_display() {
        assert_eq!(DriveStatus::NoCd.to_string(), "NO-CD");
        assert_eq!(DriveStatus::FastForward.to_string(), "FAST-FORWARD");
        assert_eq!(DriveStatus::Playing.to_string(), "PLAYING");
    }

    #[test]
    fn name_field_display() {
        assert_eq!(NameField::Track.to_string(), "track");
        assert_eq!(NameField::Artist.to_string(), "artist");
    }

    #[test]
    fn set_name_routes_to_selected_field() {
        let mut status = ChangerStatus::default();
        status.set_name(NameField::Artist, "Orbital");
        assert_eq!(status.artist_name, "Orbital");
        assert_eq!(status.track_name, "");
        assert_eq!(status.name(NameField::Artist), "Orbital");
    }

    #[test]
    fn set_name_truncates_to_capacity() {
        let mut status = ChangerStatus::default();
        status.set_name(NameField::Track, "a very long track title indeed");
        assert_eq!(status.track_name.chars().count(), MAX_NAME_LEN);
        assert_eq!(status.track_name, "a very long trac");
    }

    #[test]
    fn status_snapshot_equality() {
        let a = ChangerStatus::default();
        let mut b = a.clone();
        assert_eq!(a, b);
        b.current_track = 3;
        assert_ne!(a, b);
    }
}
