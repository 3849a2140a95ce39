//! Interrupt-side input producers for the display server.
//!
//! Everything here may run in interrupt context: nothing allocates and
//! nothing blocks for longer than a short spin lock held by the consumer's
//! single read.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod pointer;
pub mod ps2;

pub use pointer::{InputLatch, PointerAccel, PointerSnapshot};
pub use ps2::keyboard::KeyQueue;
pub use ps2::mouse::Ps2Mouse;
