//! changerlib-core: Core traits, types, and error definitions for changerlib.
//!
//! This crate defines the drive-family-agnostic abstractions that all
//! changerlib protocol engines build on. Head-unit applications and
//! diagnostic tools depend on these types without pulling in any specific
//! drive-family engine.
//!
//! # Key types
//!
//! - [`ChangerBus`] -- byte-level two-wire bus collaborator
//! - [`ChangerStatus`] / [`DriveStatus`] -- the generic disc-status model
//! - [`ChangerEvent`] -- state change notifications
//! - [`Error`] / [`Result`] -- error handling

pub mod bus;
pub mod error;
pub mod events;
pub mod status;

// Re-export key types at crate root for ergonomic `use changerlib_core::*`.
pub use bus::ChangerBus;
pub use error::{Error, Result};
pub use events::ChangerEvent;
pub use status::{ChangerStatus, DriveStatus, NameField, MAX_NAME_LEN};
