//! Status projection: complete frames into the generic status model.
//!
//! [`apply_frame`] is a pure function of the frame content (plus the
//! metadata routing target): it writes absolute values into the
//! [`ChangerStatus`] and never accumulates across frames, so projecting
//! the same frame twice yields the same status. Unknown opcodes are
//! logged and otherwise ignored -- a malformed frame must not corrupt
//! previously valid state.

use tracing::{debug, warn};

use changerlib_core::{ChangerEvent, ChangerStatus, NameField};

use crate::decode::ResponseFrame;
use crate::protocol::*;

/// Project one complete response frame into `status`.
///
/// `metadata_target` selects which name field a metadata frame's text is
/// routed into. Returns the events describing what changed; an empty
/// vector means the frame caused no observable state change.
pub fn apply_frame(
    frame: &ResponseFrame,
    metadata_target: NameField,
    status: &mut ChangerStatus,
) -> Vec<ChangerEvent> {
    let bytes = frame.as_slice();
    let mut events = Vec::new();

    match FrameClass::of(frame.opcode()) {
        FrameClass::Status => {
            project_status(bytes, status, &mut events);
        }
        FrameClass::DiscInfo => {
            if bytes.len() < SIZE_DISC_INFO {
                warn!(len = bytes.len(), "truncated disc-info frame, ignoring");
                return events;
            }
            // {0x6E, first_track, track_count, total_time, 0x01, 0x01}
            status.first_track = bytes[1];
            status.last_track = bytes[2];
            status.total_tracks = bytes[2].saturating_sub(bytes[1]).saturating_add(1);
            status.total_minutes = bytes[3];
            events.push(ChangerEvent::DiscInfo {
                first_track: status.first_track,
                last_track: status.last_track,
                total_minutes: status.total_minutes,
            });
        }
        FrameClass::Metadata => {
            project_metadata(bytes, metadata_target, status, &mut events);
        }
        FrameClass::DiscStructure => {
            if bytes.len() < SIZE_DISC_STRUCTURE {
                warn!(len = bytes.len(), "truncated disc-structure frame, ignoring");
                return events;
            }
            status.first_track = bytes[1];
            status.last_track = bytes[2];
            status.first_folder = bytes[3];
            status.last_folder = bytes[4];
            status.total_tracks = bytes[5];
            status.total_folders = bytes[6];
            status.total_files = bytes[7];
        }
        FrameClass::InitAck1 | FrameClass::InitAck2 => {
            debug!(opcode = frame.opcode(), "init acknowledgment");
        }
        FrameClass::ErrorInfo => {
            warn!(
                code = bytes.get(1).copied().unwrap_or(0),
                "drive reported an error condition"
            );
        }
        FrameClass::Unknown => {
            warn!(
                opcode = frame.opcode(),
                len = frame.len(),
                "unrecognized frame opcode, ignoring"
            );
        }
    }

    events
}

fn project_status(bytes: &[u8], status: &mut ChangerStatus, events: &mut Vec<ChangerEvent>) {
    // Unreachable for status-family opcodes, but keep projection total.
    let Some(drive_status) = drive_status_for(bytes[0]) else {
        return;
    };

    if status.drive_status != drive_status {
        status.drive_status = drive_status;
        events.push(ChangerEvent::DriveStatusChanged {
            status: drive_status,
        });
    }

    // Position and disc flags are only trustworthy in the fixed-layout
    // frames sent while playing; the CC-terminated variants carry an
    // undocumented layout and are used for the drive state alone.
    if bytes.len() > STATUS_BYTE_IDX
        && bytes[STATUS_BYTE_IDX] == (STATUS_CD_LOADED | STATUS_PLAYING_BITS)
        && bytes.len() >= SIZE_STATUS_AUDIO
    {
        status.is_mp3_disc = bytes[CDID_IDX] != CDID_AUDIO_CD;
        let (track, minute, second) = (bytes[TRACK_IDX], bytes[MINUTE_IDX], bytes[SECOND_IDX]);
        if (status.current_track, status.current_minute, status.current_second)
            != (track, minute, second)
        {
            status.current_track = track;
            status.current_minute = minute;
            status.current_second = second;
            events.push(ChangerEvent::PositionChanged {
                track,
                minute,
                second,
            });
        }
        status.is_random_enabled = bytes[FLAGS_IDX] & FLAG_RANDOM != 0;
    }
}

fn project_metadata(
    bytes: &[u8],
    target: NameField,
    status: &mut ChangerStatus,
    events: &mut Vec<ChangerEvent>,
) {
    if bytes.len() < SIZE_METADATA_TEXT || bytes[METADATA_MARK_IDX] != METADATA_EXISTS {
        // Short frame: no text available for the requested field.
        debug!(field = %target, "no metadata on disc");
        status.set_name(target, "");
        return;
    }

    let text: String = bytes[METADATA_TEXT_IDX..]
        .iter()
        .copied()
        .filter(|b| b.is_ascii_graphic() || *b == b' ')
        .map(char::from)
        .collect();
    let text = text.trim_end().to_string();
    status.set_name(target, &text);
    events.push(ChangerEvent::MetadataText {
        field: target,
        text: status.name(target).to_string(),
    });
}
