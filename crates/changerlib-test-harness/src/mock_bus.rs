//! Mock bus for deterministic testing of protocol engines.
//!
//! [`MockBus`] implements the [`ChangerBus`] trait with scripted
//! select-line samples and pre-loaded byte exchanges. This lets you test
//! command transmission, handshake validation, edge detection, and frame
//! inference without real hardware.
//!
//! # Example
//!
//! ```
//! use changerlib_test_harness::MockBus;
//!
//! let mut bus = MockBus::new();
//! // Pre-load: when the engine transfers 0xE4 (play), reply 0x5A (ACK).
//! bus.expect(0xE4, 0x5A);
//! // Script a select-line pulse for the slave engine's edge detector.
//! bus.push_level(true);
//! bus.push_level(false);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;

use changerlib_core::bus::ChangerBus;
use changerlib_core::error::{Error, Result};

/// Outcome of one scripted byte exchange.
#[derive(Debug, Clone)]
enum Outcome {
    /// The peer clocks this byte back.
    Reply(u8),
    /// The physical exchange fails.
    Fail,
}

/// A pre-loaded byte exchange.
#[derive(Debug, Clone)]
struct Exchange {
    /// When set, the engine must transfer exactly this byte.
    expect_sent: Option<u8>,
    outcome: Outcome,
}

/// A mock [`ChangerBus`] for testing protocol engines without hardware.
///
/// Exchanges are consumed in order: each `transfer_byte` call pops the
/// next scripted exchange, checks the sent byte against the expectation,
/// and returns the scripted outcome. Select-line reads consume queued
/// one-shot samples first and then fall back to a sticky level, so an
/// idle line does not need an infinite script.
#[derive(Debug)]
pub struct MockBus {
    /// One-shot select-line samples, consumed in order.
    levels: VecDeque<bool>,
    /// Level returned once the queue is drained.
    resting_level: bool,
    /// Ordered queue of scripted byte exchanges.
    exchanges: VecDeque<Exchange>,
    /// Log of every byte the engine transferred, failures included.
    sent_log: Vec<u8>,
    connected: bool,
}

impl MockBus {
    /// Create a connected mock bus with an idle-high select line and no
    /// scripted exchanges.
    pub fn new() -> Self {
        MockBus {
            levels: VecDeque::new(),
            resting_level: true,
            exchanges: VecDeque::new(),
            sent_log: Vec::new(),
            connected: true,
        }
    }

    /// Queue one select-line sample; consumed by the next `select_level`.
    pub fn push_level(&mut self, level: bool) {
        self.levels.push_back(level);
    }

    /// Set the level reported once all queued samples are consumed.
    pub fn set_level(&mut self, level: bool) {
        self.resting_level = level;
    }

    /// Script an exchange: the engine must transfer `sent`, the peer
    /// replies with `reply`.
    pub fn expect(&mut self, sent: u8, reply: u8) {
        self.exchanges.push_back(Exchange {
            expect_sent: Some(sent),
            outcome: Outcome::Reply(reply),
        });
    }

    /// Script an exchange that replies with `reply` regardless of what
    /// the engine transfers.
    pub fn expect_any(&mut self, reply: u8) {
        self.exchanges.push_back(Exchange {
            expect_sent: None,
            outcome: Outcome::Reply(reply),
        });
    }

    /// Script an exchange that fails at the physical layer.
    pub fn expect_failure(&mut self) {
        self.exchanges.push_back(Exchange {
            expect_sent: None,
            outcome: Outcome::Fail,
        });
    }

    /// Every byte the engine has transferred, in order, including bytes
    /// whose exchange failed.
    pub fn sent_bytes(&self) -> &[u8] {
        &self.sent_log
    }

    /// Number of scripted exchanges not yet consumed.
    pub fn remaining_exchanges(&self) -> usize {
        self.exchanges.len()
    }

    /// Set the connected state. When `false`, bus calls return
    /// [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangerBus for MockBus {
    async fn select_level(&mut self) -> Result<bool> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        Ok(self.levels.pop_front().unwrap_or(self.resting_level))
    }

    async fn transfer_byte(&mut self, out: u8) -> Result<u8> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.sent_log.push(out);

        let Some(exchange) = self.exchanges.pop_front() else {
            return Err(Error::Protocol(format!(
                "unscripted transfer of 0x{out:02X}: no more exchanges in mock bus"
            )));
        };
        if let Some(expected) = exchange.expect_sent {
            if out != expected {
                return Err(Error::Protocol(format!(
                    "unexpected transfer: expected 0x{expected:02X}, got 0x{out:02X}"
                )));
            }
        }
        match exchange.outcome {
            Outcome::Reply(reply) => Ok(reply),
            Outcome::Fail => Err(Error::Transport("injected bus fault".into())),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
