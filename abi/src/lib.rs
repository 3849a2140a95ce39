//! Display server value types
//!
//! This crate provides the canonical definitions for every type shared
//! between the interrupt-side drivers, the drawing library and the display
//! server itself. Having a single source of truth means the pointer driver,
//! the blit engine and the window manager all agree on what a `Rect` or a
//! pixel is.

#![no_std]
#![forbid(unsafe_code)]

pub mod display;
pub mod draw;
pub mod font;
pub mod geometry;
pub mod input;
pub mod pixel;

#[cfg(test)]
extern crate std;

pub use display::DisplayMode;
pub use draw::{Canvas, Color32, EncodedPixel};
pub use geometry::{Coordinate, Rect, Size};
pub use input::ButtonMask;
pub use pixel::PixelFormat;
