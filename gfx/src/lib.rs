//! Pixel surfaces and the operations that fill and composite them.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod blit;
pub mod canvas_font;
pub mod canvas_ops;
pub mod layer;

pub use blit::{blit_layer, layer_snapshot};
pub use canvas_ops::{Thickness, draw_rect};
pub use layer::Layer;
