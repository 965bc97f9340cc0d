//! Master-role engines: command transmission and response capture.
//!
//! The transmit engine services at most one pending command per tick, in
//! command-table priority order. Each payload byte must be answered with
//! [`SLAVE_ACK`]; anything else aborts the attempt after a fixed backoff
//! and leaves the request flag set, so the whole payload is retried on a
//! later tick. There is no byte-resume: a partially sent command restarts
//! from its first byte.
//!
//! The capture engine is the optional diagnostic path (off unless
//! [`ChangerConfig::capture_responses`](crate::changer::ChangerConfig) is
//! set): when the peer holds the select line low, it clocks response
//! bytes in -- sending [`MASTER_ACK`] for each -- and feeds them to the
//! frame decoder until one complete frame has been captured and
//! projected.

use tokio::time::sleep;
use tracing::{debug, trace};

use changerlib_core::{ChangerBus, ChangerEvent, Error, Result};

use crate::changer::M515Changer;
use crate::decode::FrameEvent;
use crate::project::apply_frame;
use crate::protocol::{MASTER_ACK, REQ_GOTO_TRACK, SLAVE_ACK};

impl<B: ChangerBus> M515Changer<B> {
    /// Drive the master transmit engine for one tick.
    ///
    /// Returns `Ok(())` when no command was pending or the selected
    /// command's payload was fully transmitted and acknowledged. A
    /// [`Error::Nak`] or transport error means the attempt was aborted;
    /// the command stays queued.
    pub async fn poll_transmit(&mut self) -> Result<()> {
        if let Some(cmd) = self.flags.first_pending() {
            self.send_payload(cmd.payload()).await?;
            self.flags.clear(cmd);
            debug!(?cmd, "command transmitted and acknowledged");
            return Ok(());
        }

        // The explicit goto-track request rides below the whole table.
        if let Some(track) = self.goto_track {
            self.send_payload(&[REQ_GOTO_TRACK, track]).await?;
            self.goto_track = None;
            debug!(track, "goto-track transmitted and acknowledged");
        }
        Ok(())
    }

    /// Transmit one payload byte-by-byte, validating each acknowledgment.
    async fn send_payload(&mut self, payload: &[u8]) -> Result<()> {
        for (i, &byte) in payload.iter().enumerate() {
            if i > 0 {
                // The slave needs processing time between bytes.
                sleep(self.config.inter_byte_delay).await;
            }
            match self.bus.transfer_byte(byte).await {
                Ok(ack) if ack == SLAVE_ACK => {
                    trace!(index = i, byte, "payload byte acknowledged");
                }
                Ok(ack) => {
                    debug!(index = i, byte, ack, "payload byte not acknowledged");
                    sleep(self.config.error_backoff).await;
                    return Err(Error::Nak {
                        sent: byte,
                        got: ack,
                    });
                }
                Err(e) => {
                    debug!(index = i, byte, error = %e, "byte transfer failed");
                    sleep(self.config.error_backoff).await;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Drive the response-capture engine for one tick.
    ///
    /// No-op unless response capture is enabled and the peer is holding
    /// the select line low (response pending). Otherwise clocks bytes in
    /// until the decoder judges one frame complete, projects it, and
    /// emits the matching events. A mid-frame bus error discards the
    /// partial frame and returns [`Error::FrameReset`]; the next capture
    /// starts a fresh frame.
    pub async fn poll_receive(&mut self) -> Result<()> {
        if !self.config.capture_responses {
            return Ok(());
        }
        if self.bus.select_level().await? {
            // Line idle: nothing to capture this tick.
            return Ok(());
        }

        loop {
            sleep(self.config.inter_byte_delay).await;
            let byte = match self.bus.transfer_byte(MASTER_ACK).await {
                Ok(byte) => byte,
                Err(e) => {
                    let discarded = self.decoder.buffered();
                    self.decoder.reset();
                    if discarded > 0 {
                        debug!(discarded, error = %e, "bus error mid-frame, resetting");
                        self.emit(ChangerEvent::FrameDropped { discarded });
                        return Err(Error::FrameReset);
                    }
                    return Err(e);
                }
            };

            trace!(byte, buffered = self.decoder.buffered(), "captured response byte");
            if let FrameEvent::Complete(frame) = self.decoder.ingest(byte) {
                debug!(
                    opcode = frame.opcode(),
                    len = frame.len(),
                    "response frame complete"
                );
                let events = apply_frame(&frame, self.metadata_target, &mut self.status);
                for event in events {
                    self.emit(event);
                }
                self.emit(ChangerEvent::FrameCompleted {
                    opcode: frame.opcode(),
                    len: frame.len(),
                });
                return Ok(());
            }
        }
    }

    /// Convenience wrapper used by master-role polling drivers: one
    /// transmit tick followed by one capture tick, mirroring how the
    /// head unit interleaves the two.
    pub async fn poll_master(&mut self) -> Result<()> {
        self.poll_transmit().await?;
        self.poll_receive().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changer::ChangerConfig;
    use crate::command::Command;
    use changerlib_test_harness::MockBus;

    fn master(bus: MockBus) -> M515Changer<MockBus> {
        M515Changer::new(bus)
    }

    #[tokio::test(start_paused = true)]
    async fn idle_tick_touches_nothing() {
        let mut changer = master(MockBus::new());
        changer.poll_transmit().await.unwrap();
        assert!(changer.into_bus().sent_bytes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn single_byte_command_clears_flag_on_ack() {
        let mut bus = MockBus::new();
        bus.expect(0xE4, SLAVE_ACK);
        let mut changer = master(bus);

        changer.request(Command::PlayTrack);
        changer.poll_transmit().await.unwrap();

        assert!(!changer.is_pending(Command::PlayTrack));
        assert_eq!(changer.into_bus().sent_bytes(), &[0xE4]);
    }

    #[tokio::test(start_paused = true)]
    async fn multi_byte_payload_sent_in_order() {
        let mut bus = MockBus::new();
        for &b in &[0x5F, 0x50, 0xFE, 0x3B] {
            bus.expect(b, SLAVE_ACK);
        }
        let mut changer = master(bus);

        changer.request(Command::Init);
        let start = tokio::time::Instant::now();
        changer.poll_transmit().await.unwrap();

        // Three inter-byte gaps for a four-byte payload.
        assert!(start.elapsed() >= changer.config.inter_byte_delay * 3);
        assert!(!changer.is_pending(Command::Init));
        assert_eq!(changer.into_bus().sent_bytes(), &[0x5F, 0x50, 0xFE, 0x3B]);
    }

    #[tokio::test(start_paused = true)]
    async fn nak_keeps_flag_set_and_retries_from_byte_zero() {
        let mut bus = MockBus::new();
        // First attempt: second byte gets the wrong acknowledgment.
        bus.expect(0x5F, SLAVE_ACK);
        bus.expect(0x50, 0x00);
        // Second attempt: the whole payload again, clean.
        for &b in &[0x5F, 0x50, 0xFE, 0x3B] {
            bus.expect(b, SLAVE_ACK);
        }
        let mut changer = master(bus);

        changer.request(Command::Init);
        let err = changer.poll_transmit().await.unwrap_err();
        assert!(matches!(err, Error::Nak { sent: 0x50, got: 0x00 }));
        assert!(changer.is_pending(Command::Init), "flag must survive a NAK");

        changer.poll_transmit().await.unwrap();
        assert!(!changer.is_pending(Command::Init));
        assert_eq!(
            changer.into_bus().sent_bytes(),
            &[0x5F, 0x50, 0x5F, 0x50, 0xFE, 0x3B]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_keeps_flag_set() {
        let mut bus = MockBus::new();
        bus.expect_failure();
        let mut changer = master(bus);

        changer.request(Command::StopTrack);
        assert!(changer.poll_transmit().await.is_err());
        assert!(changer.is_pending(Command::StopTrack));
    }

    #[tokio::test(start_paused = true)]
    async fn priority_services_lower_index_first() {
        let mut bus = MockBus::new();
        bus.expect(0xE2, SLAVE_ACK);
        let mut changer = master(bus);

        changer.request(Command::DiscInfo);
        changer.request(Command::StopTrack);
        changer.poll_transmit().await.unwrap();

        // Only the earlier table entry went out this tick.
        assert!(!changer.is_pending(Command::StopTrack));
        assert!(changer.is_pending(Command::DiscInfo));
        assert_eq!(changer.into_bus().sent_bytes(), &[0xE2]);
    }

    #[tokio::test(start_paused = true)]
    async fn goto_track_rides_below_the_table() {
        let mut bus = MockBus::new();
        bus.expect(0xE4, SLAVE_ACK);
        bus.expect(0xF4, SLAVE_ACK);
        bus.expect(0x07, SLAVE_ACK);
        let mut changer = master(bus);

        changer.goto_track(7);
        changer.request(Command::PlayTrack);

        // First tick services the table command only.
        changer.poll_transmit().await.unwrap();
        // Second tick drains the goto request.
        changer.poll_transmit().await.unwrap();

        assert_eq!(changer.into_bus().sent_bytes(), &[0xE4, 0xF4, 0x07]);
    }

    #[tokio::test(start_paused = true)]
    async fn capture_disabled_ignores_pending_response() {
        let mut bus = MockBus::new();
        bus.set_level(false);
        let mut changer = master(bus);
        changer.poll_receive().await.unwrap();
        assert!(changer.into_bus().sent_bytes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn capture_decodes_and_projects_one_frame() {
        let mut bus = MockBus::new();
        bus.set_level(false);
        for &b in &[0x6E, 0x01, 0x0C, 0x49, 0x01, 0x01] {
            bus.expect(MASTER_ACK, b);
        }
        let mut changer = M515Changer::with_config(
            bus,
            ChangerConfig {
                capture_responses: true,
                ..ChangerConfig::default()
            },
        );
        let mut events = changer.subscribe();

        changer.poll_receive().await.unwrap();

        assert_eq!(changer.status().last_track, 12);
        assert!(matches!(
            events.try_recv().unwrap(),
            ChangerEvent::DiscInfo { last_track: 12, .. }
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            ChangerEvent::FrameCompleted { opcode: 0x6E, len: 6 }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn capture_skips_when_line_idle() {
        let mut bus = MockBus::new();
        bus.set_level(true);
        let mut changer = M515Changer::with_config(
            bus,
            ChangerConfig {
                capture_responses: true,
                ..ChangerConfig::default()
            },
        );
        changer.poll_receive().await.unwrap();
        assert!(changer.into_bus().sent_bytes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn capture_error_mid_frame_resets_cleanly() {
        let mut bus = MockBus::new();
        bus.set_level(false);
        // Two good bytes of a status frame, then a bus fault.
        bus.expect(MASTER_ACK, 0x72);
        bus.expect(MASTER_ACK, 0x01);
        bus.expect_failure();
        // The retried capture delivers a clean disc-info frame.
        for &b in &[0x6E, 0x01, 0x05, 0x30, 0x01, 0x01] {
            bus.expect(MASTER_ACK, b);
        }
        let mut changer = M515Changer::with_config(
            bus,
            ChangerConfig {
                capture_responses: true,
                ..ChangerConfig::default()
            },
        );
        let mut events = changer.subscribe();

        let err = changer.poll_receive().await.unwrap_err();
        assert!(matches!(err, Error::FrameReset));
        assert!(matches!(
            events.try_recv().unwrap(),
            ChangerEvent::FrameDropped { discarded: 2 }
        ));
        // No partial mutation from the aborted frame.
        assert_eq!(changer.status(), Default::default());

        changer.poll_receive().await.unwrap();
        assert_eq!(changer.status().last_track, 5);
    }
}
