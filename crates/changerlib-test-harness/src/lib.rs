//! changerlib-test-harness: mock bus for deterministic testing of
//! changerlib protocol engines.
//!
//! This crate provides [`MockBus`], an implementation of
//! [`ChangerBus`](changerlib_core::ChangerBus) with scripted select-line
//! levels and byte exchanges, so engine behavior -- acknowledgment
//! validation, retry policy, edge detection, frame inference -- can be
//! tested without a head unit or a changer on a bench.

pub mod mock_bus;

pub use mock_bus::MockBus;
