//! End-to-end exercises of the protocol engines over the mock bus.
//!
//! These tests drive the public facade API the way a polling host would:
//! queue requests, tick the engines, and observe the projected status and
//! broadcast events.

use changerlib::m515::{ChangerConfig, Command, M515Changer};
use changerlib::{ChangerEvent, DriveStatus, Error, NameField};
use changerlib_test_harness::MockBus;

const SLAVE_ACK: u8 = 0x5A;
const MASTER_ACK: u8 = 0xDB;

fn capture_config() -> ChangerConfig {
    ChangerConfig {
        capture_responses: true,
        ..ChangerConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn master_session_drains_queued_commands_in_priority_order() {
    let mut bus = MockBus::new();
    // Stop (0xE2) outranks play (0xE4) outranks disc-info (0xFC).
    bus.expect(0xE2, SLAVE_ACK);
    bus.expect(0xE4, SLAVE_ACK);
    bus.expect(0xFC, SLAVE_ACK);

    let mut changer = M515Changer::new(bus);
    changer.request(Command::DiscInfo);
    changer.request(Command::PlayTrack);
    changer.request(Command::StopTrack);

    for _ in 0..3 {
        changer.poll_transmit().await.unwrap();
    }

    assert!(!changer.is_pending(Command::StopTrack));
    assert!(!changer.is_pending(Command::PlayTrack));
    assert!(!changer.is_pending(Command::DiscInfo));
    assert_eq!(changer.into_bus().sent_bytes(), &[0xE2, 0xE4, 0xFC]);
}

#[tokio::test(start_paused = true)]
async fn failed_command_is_retried_wholesale_on_a_later_tick() {
    let mut bus = MockBus::new();
    // Attempt 1: transport fault on the first init byte.
    bus.expect_failure();
    // Attempt 2: wrong acknowledgment on the third byte.
    bus.expect(0x5F, SLAVE_ACK);
    bus.expect(0x50, SLAVE_ACK);
    bus.expect(0xFE, 0x00);
    // Attempt 3: clean.
    for byte in [0x5F, 0x50, 0xFE, 0x3B] {
        bus.expect(byte, SLAVE_ACK);
    }

    let mut changer = M515Changer::new(bus);
    changer.request(Command::Init);

    assert!(changer.poll_transmit().await.is_err());
    assert!(changer.is_pending(Command::Init));

    assert!(matches!(
        changer.poll_transmit().await.unwrap_err(),
        Error::Nak { sent: 0xFE, got: 0x00 }
    ));
    assert!(changer.is_pending(Command::Init));

    changer.poll_transmit().await.unwrap();
    assert!(!changer.is_pending(Command::Init));
}

#[tokio::test(start_paused = true)]
async fn status_capture_updates_drive_status_and_emits_events() {
    let mut bus = MockBus::new();
    bus.set_level(false);
    // A CC-terminated stopped-status frame.
    for byte in [0x72, 0x01, 0xCC, 0xCC] {
        bus.expect(MASTER_ACK, byte);
    }

    let mut changer = M515Changer::with_config(bus, capture_config());
    let mut events = changer.subscribe();

    changer.poll_receive().await.unwrap();

    assert_eq!(changer.status().drive_status, DriveStatus::Stopped);
    assert!(matches!(
        events.try_recv().unwrap(),
        ChangerEvent::DriveStatusChanged {
            status: DriveStatus::Stopped
        }
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        ChangerEvent::FrameCompleted { opcode: 0x72, len: 4 }
    ));
}

#[tokio::test(start_paused = true)]
async fn metadata_capture_routes_text_to_the_selected_field() {
    let mut bus = MockBus::new();
    bus.set_level(false);
    let mut frame = vec![0x69, 0x10, 0, 0, 0, 0, 0, 0, 0];
    frame.extend_from_slice(b"FOUR TET     ");
    for byte in frame {
        bus.expect(MASTER_ACK, byte);
    }

    let mut changer = M515Changer::with_config(bus, capture_config());
    changer.set_metadata_target(NameField::Artist);

    changer.poll_receive().await.unwrap();

    let status = changer.status();
    assert_eq!(status.artist_name, "FOUR TET");
    assert_eq!(status.track_name, "");
}

#[tokio::test(start_paused = true)]
async fn aborted_frame_never_leaks_into_the_next_one() {
    let mut bus = MockBus::new();
    bus.set_level(false);
    // A playing-status frame is cut off by a bus fault...
    bus.expect(MASTER_ACK, 0x64);
    bus.expect(MASTER_ACK, 0x64);
    bus.expect(MASTER_ACK, 0x01);
    bus.expect_failure();
    // ...and a fresh disc-info frame follows.
    for byte in [0x6E, 0x01, 0x08, 0x3C, 0x01, 0x01] {
        bus.expect(MASTER_ACK, byte);
    }

    let mut changer = M515Changer::with_config(bus, capture_config());

    assert!(matches!(
        changer.poll_receive().await.unwrap_err(),
        Error::FrameReset
    ));
    let after_reset = changer.status();
    assert_eq!(after_reset.drive_status, DriveStatus::NoCd);
    assert_eq!(after_reset.current_track, 0);

    changer.poll_receive().await.unwrap();
    let status = changer.status();
    assert_eq!(status.first_track, 1);
    assert_eq!(status.last_track, 8);
    assert_eq!(status.total_minutes, 0x3C);
    // Nothing from the aborted playing frame stuck.
    assert_eq!(status.drive_status, DriveStatus::NoCd);
}

#[tokio::test(start_paused = true)]
async fn slave_role_answers_each_pulse_once() {
    let mut bus = MockBus::new();
    bus.set_level(false);
    for command_byte in [0xE4u8, 0xEC, 0xE2] {
        bus.push_level(true);
        bus.push_level(false);
        bus.expect(SLAVE_ACK, command_byte);
    }

    let mut changer = M515Changer::new(bus);
    for _ in 0..9 {
        changer.poll_slave().await.unwrap();
    }

    assert_eq!(
        changer.into_bus().sent_bytes(),
        &[SLAVE_ACK, SLAVE_ACK, SLAVE_ACK]
    );
}

#[tokio::test(start_paused = true)]
async fn projecting_the_same_frame_twice_is_idempotent() {
    let mut bus = MockBus::new();
    bus.set_level(false);
    let frame = [0x64, 0x64, 0x01, 0x04, 0x01, 0x10, 0x00, 0x00, 0x00, 0x00];
    for byte in frame {
        bus.expect(MASTER_ACK, byte);
    }
    for byte in frame {
        bus.expect(MASTER_ACK, byte);
    }

    let mut changer = M515Changer::with_config(bus, capture_config());

    changer.poll_receive().await.unwrap();
    let first = changer.status();
    changer.poll_receive().await.unwrap();
    assert_eq!(changer.status(), first);
    assert_eq!(first.drive_status, DriveStatus::Playing);
    assert_eq!(first.current_track, 4);
}
