//! Master-role example: queue commands and tick the transmit engine.
//!
//! Runs against the scripted `MockBus` from `changerlib-test-harness`, so
//! it works without hardware; swap in a GPIO-backed `ChangerBus`
//! implementation to drive a real changer.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p changerlib --example request_playback
//! ```

use changerlib::m515::{Command, M515Changer};
use changerlib_test_harness::MockBus;

#[tokio::main(flavor = "current_thread")]
async fn main() -> changerlib::Result<()> {
    let mut bus = MockBus::new();
    // Script the slave's acknowledgment for every payload byte we will send:
    // the four-byte init frame, then play, then disc-info.
    for byte in [0x5F, 0x50, 0xFE, 0x3B, 0xE4, 0xFC] {
        bus.expect(byte, 0x5A);
    }

    let mut changer = M515Changer::new(bus);
    changer.request(Command::Init);
    changer.request(Command::PlayTrack);
    changer.request(Command::DiscInfo);

    // One command per tick, highest-priority first.
    let mut tick = 0;
    while changer.is_pending(Command::Init)
        || changer.is_pending(Command::PlayTrack)
        || changer.is_pending(Command::DiscInfo)
    {
        changer.poll_transmit().await?;
        tick += 1;
        println!("tick {tick}: init={} play={} disc-info={}",
            changer.is_pending(Command::Init),
            changer.is_pending(Command::PlayTrack),
            changer.is_pending(Command::DiscInfo));
    }

    println!("all commands acknowledged after {tick} ticks");
    println!("bytes on the wire: {:02X?}", changer.into_bus().sent_bytes());
    Ok(())
}
