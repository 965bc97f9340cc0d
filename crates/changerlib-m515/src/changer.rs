//! `M515Changer`: the per-tick protocol engine for a 34W515-family bus.
//!
//! One instance owns the bus, the request flags, the frame decoder, and
//! the projected status. An external polling driver calls one of the
//! `poll_*` methods once per scheduler tick depending on the emulated
//! role; none of them blocks beyond the protocol-mandated waits, which
//! are scheduled through `tokio::time::sleep` so other tasks keep running.
//!
//! The shared mutable state (`ChangerStatus`, request flags) has exactly
//! one writer per field group by construction: callers set request flags
//! through [`request`](M515Changer::request), the transmit engine alone
//! clears them, and status projection alone writes the status.

use std::time::Duration;

use tokio::sync::broadcast;

use changerlib_core::{ChangerBus, ChangerEvent, ChangerStatus, NameField};

use crate::command::{Command, CommandFlags};
use crate::decode::FrameDecoder;
use crate::protocol::{ERROR_BACKOFF, HANDSHAKE_SETTLE, INTER_BYTE_DELAY};
use crate::slave::EdgeDetector;

/// Depth of the event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Tunable behavior of an [`M515Changer`].
///
/// The defaults are the protocol-mandated values; they exist as fields so
/// tests and unusual hosts can tighten or stretch them.
#[derive(Debug, Clone)]
pub struct ChangerConfig {
    /// Whether [`poll_receive`](M515Changer::poll_receive) captures and
    /// decodes slave responses. Off by default: response capture is a
    /// diagnostic facility and keeps the bus busy while enabled.
    pub capture_responses: bool,
    /// Gap between consecutive payload bytes of one command frame.
    pub inter_byte_delay: Duration,
    /// Backoff after a failed or unacknowledged byte transfer.
    pub error_backoff: Duration,
    /// Settle time before answering a detected select pulse.
    pub settle_delay: Duration,
}

impl Default for ChangerConfig {
    fn default() -> Self {
        ChangerConfig {
            capture_responses: false,
            inter_byte_delay: INTER_BYTE_DELAY,
            error_backoff: ERROR_BACKOFF,
            settle_delay: HANDSHAKE_SETTLE,
        }
    }
}

/// Protocol engine for one 34W515-family bus endpoint.
///
/// The same type drives either role: call
/// [`poll_transmit`](M515Changer::poll_transmit) (and optionally
/// [`poll_receive`](M515Changer::poll_receive)) once per tick to act as
/// the bus master, or [`poll_slave`](M515Changer::poll_slave) to act as
/// the emulated changer answering handshakes.
pub struct M515Changer<B> {
    pub(crate) bus: B,
    pub(crate) config: ChangerConfig,
    pub(crate) flags: CommandFlags,
    /// Explicit goto-track request; serviced after the command table.
    pub(crate) goto_track: Option<u8>,
    pub(crate) edge: EdgeDetector,
    pub(crate) decoder: FrameDecoder,
    pub(crate) status: ChangerStatus,
    pub(crate) metadata_target: NameField,
    pub(crate) event_tx: broadcast::Sender<ChangerEvent>,
}

impl<B: ChangerBus> M515Changer<B> {
    /// Create an engine over `bus` with default configuration.
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, ChangerConfig::default())
    }

    /// Create an engine over `bus` with an explicit configuration.
    pub fn with_config(bus: B, config: ChangerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        M515Changer {
            bus,
            config,
            flags: CommandFlags::new(),
            goto_track: None,
            edge: EdgeDetector::new(),
            decoder: FrameDecoder::new(),
            status: ChangerStatus::default(),
            metadata_target: NameField::default(),
            event_tx,
        }
    }

    /// Queue a command for transmission.
    ///
    /// The request stays pending until the transmit engine has sent and
    /// had acknowledged every payload byte; a failed attempt leaves it
    /// pending for a wholesale retry.
    pub fn request(&mut self, cmd: Command) {
        self.flags.request(cmd);
    }

    /// Queue a jump to an explicit track number.
    ///
    /// Serviced after every table command; a newer request replaces an
    /// unserviced older one.
    pub fn goto_track(&mut self, track: u8) {
        self.goto_track = Some(track);
    }

    /// Whether a command is still pending.
    pub fn is_pending(&self, cmd: Command) -> bool {
        self.flags.is_pending(cmd)
    }

    /// Select which name field the next metadata response is routed into.
    pub fn set_metadata_target(&mut self, field: NameField) {
        self.metadata_target = field;
    }

    /// A snapshot of the projected changer status.
    pub fn status(&self) -> ChangerStatus {
        self.status.clone()
    }

    /// Subscribe to state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangerEvent> {
        self.event_tx.subscribe()
    }

    /// Tear down the engine and recover the bus.
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Broadcast an event; delivery is best-effort.
    pub(crate) fn emit(&self, event: ChangerEvent) {
        let _ = self.event_tx.send(event);
    }
}
