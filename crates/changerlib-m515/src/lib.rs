//! changerlib-m515: protocol engine for the 34W515 CD-changer drive family.
//!
//! This crate implements both ends of the two-wire, clock-less,
//! byte-handshaked bus spoken by 34W515-style multi-disc changers:
//!
//! - the **master** role (head unit): queues fixed command frames and
//!   transmits them one byte per timing slot, validating the per-byte
//!   acknowledgment, with an optional diagnostic capture path that decodes
//!   slave responses;
//! - the **slave** role (emulated changer): detects the master's select
//!   pulse and answers each transferred byte with the handshake constant;
//! - **frame-length inference** for the master-receive direction, since
//!   response frames carry no length prefix;
//! - **status projection** from captured frames into the shared
//!   [`ChangerStatus`](changerlib_core::ChangerStatus) model.
//!
//! Everything is tick-driven: an external polling loop calls one of the
//! [`M515Changer`] `poll_*` methods per scheduler tick, and the engine
//! suspends only for the short, protocol-mandated delays.

pub mod changer;
pub mod command;
pub mod decode;
pub mod master;
pub mod project;
pub mod protocol;
pub mod slave;

pub use changer::{ChangerConfig, M515Changer};
pub use command::{Command, CommandFlags, COMMANDS};
pub use decode::{FrameDecoder, FrameEvent, ResponseFrame};
pub use project::apply_frame;
