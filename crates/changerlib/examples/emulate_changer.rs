//! Slave-role example: answer the head unit's handshake pulses.
//!
//! The emulated changer never speaks first. It watches the select line
//! for the master's high-then-low pulse and answers each transferred
//! byte with the slave acknowledgment constant.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p changerlib --example emulate_changer
//! ```

use changerlib::m515::M515Changer;
use changerlib_test_harness::MockBus;

#[tokio::main(flavor = "current_thread")]
async fn main() -> changerlib::Result<()> {
    let mut bus = MockBus::new();
    bus.set_level(false);

    // Script two select pulses from the head unit, each followed by a
    // command byte arriving in the handshake exchange.
    for command_byte in [0xE4u8, 0xE2] {
        bus.push_level(true);
        bus.push_level(false);
        bus.expect(0x5A, command_byte);
    }

    let mut changer = M515Changer::new(bus);
    for tick in 0..6 {
        changer.poll_slave().await?;
        println!("tick {tick}: polled select line");
    }

    println!(
        "handshakes answered: {:02X?}",
        changer.into_bus().sent_bytes()
    );
    Ok(())
}
