//! Slave-role engine: select-pulse detection and handshake response.
//!
//! The emulated changer never originates a transaction. It watches the
//! shared select line for a full high pulse -- a rising edge followed by
//! a falling edge -- which is the master's "I have a byte ready" signal,
//! waits a short settle delay, and answers the transfer with the fixed
//! [`SLAVE_ACK`] handshake byte.

use tokio::time::sleep;
use tracing::trace;

use changerlib_core::{ChangerBus, Result};

use crate::changer::M515Changer;
use crate::protocol::SLAVE_ACK;

/// Edge detector over sampled select-line levels.
///
/// `Idle -> SeenHigh` when the line samples high, `SeenHigh -> fired`
/// when it samples low again. A line that never goes high, or stays high
/// forever, never fires. The detector re-arms itself the moment it fires.
#[derive(Debug, Default)]
pub(crate) struct EdgeDetector {
    saw_high: bool,
}

impl EdgeDetector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed one sampled level; returns `true` when a complete
    /// high-then-low pulse has been observed.
    pub(crate) fn observe(&mut self, level: bool) -> bool {
        if !self.saw_high {
            if level {
                self.saw_high = true;
            }
            return false;
        }
        if !level {
            self.saw_high = false;
            return true;
        }
        false
    }
}

impl<B: ChangerBus> M515Changer<B> {
    /// Drive the slave handshake engine for one tick.
    ///
    /// Samples the select line once. When the sample completes a
    /// high-then-low pulse, answers the master's byte with [`SLAVE_ACK`]
    /// after the settle delay. A failed handshake transfer is reported
    /// but leaves the detector re-armed at idle either way.
    pub async fn poll_slave(&mut self) -> Result<()> {
        let level = self.bus.select_level().await?;
        if !self.edge.observe(level) {
            return Ok(());
        }

        sleep(self.config.settle_delay).await;
        let received = self.bus.transfer_byte(SLAVE_ACK).await?;
        trace!(sent = SLAVE_ACK, received, "handshake exchange");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use changerlib_test_harness::MockBus;

    #[test]
    fn detector_fires_only_on_full_pulse() {
        let mut edge = EdgeDetector::new();
        assert!(!edge.observe(false));
        assert!(!edge.observe(true));
        assert!(edge.observe(false), "high then low must fire");
        // Re-armed: a bare low does nothing.
        assert!(!edge.observe(false));
    }

    #[test]
    fn detector_never_fires_while_line_stays_high() {
        let mut edge = EdgeDetector::new();
        for _ in 0..16 {
            assert!(!edge.observe(true));
        }
    }

    #[test]
    fn detector_never_fires_while_line_stays_low() {
        let mut edge = EdgeDetector::new();
        for _ in 0..16 {
            assert!(!edge.observe(false));
        }
    }

    #[test]
    fn detector_fires_once_per_pulse() {
        let mut edge = EdgeDetector::new();
        edge.observe(true);
        assert!(edge.observe(false));
        edge.observe(true);
        assert!(edge.observe(false));
    }

    #[tokio::test(start_paused = true)]
    async fn slave_answers_a_detected_pulse() {
        let mut bus = MockBus::new();
        bus.push_level(false);
        bus.push_level(true);
        bus.push_level(false);
        bus.expect(SLAVE_ACK, 0xE4);
        let mut changer = M515Changer::new(bus);

        changer.poll_slave().await.unwrap();
        changer.poll_slave().await.unwrap();
        changer.poll_slave().await.unwrap();

        assert_eq!(changer.into_bus().sent_bytes(), &[SLAVE_ACK]);
    }

    #[tokio::test(start_paused = true)]
    async fn slave_ignores_idle_line() {
        let mut bus = MockBus::new();
        bus.set_level(false);
        let mut changer = M515Changer::new(bus);

        for _ in 0..8 {
            changer.poll_slave().await.unwrap();
        }
        assert!(changer.into_bus().sent_bytes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slave_error_still_rearms_detector() {
        let mut bus = MockBus::new();
        // First pulse: handshake transfer fails.
        bus.push_level(true);
        bus.push_level(false);
        // Second pulse: handshake succeeds.
        bus.push_level(true);
        bus.push_level(false);
        bus.expect_failure();
        bus.expect(SLAVE_ACK, 0xE2);
        let mut changer = M515Changer::new(bus);

        changer.poll_slave().await.unwrap();
        assert!(changer.poll_slave().await.is_err());
        changer.poll_slave().await.unwrap();
        changer.poll_slave().await.unwrap();

        assert_eq!(changer.into_bus().sent_bytes(), &[SLAVE_ACK, SLAVE_ACK]);
    }
}
