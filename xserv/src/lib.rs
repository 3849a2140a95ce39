//! The display server core: the view tree, its redraw and compositing
//! passes, the window manager, and the frame loop that ties them to the
//! platform.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod compositor;
pub mod config;
pub mod desktop;
pub mod error;
pub mod frame;
pub mod platform;
pub mod redraw;
pub mod screen;
pub mod tree;
pub mod view;
pub mod wm;

#[cfg(test)]
mod testing;

pub use config::{RedrawMode, ServerConfig, config_from_cmdline};
pub use error::{XservError, XservResult};
pub use frame::Xserv;
pub use platform::{
    BitmapLoader, Clock, DisplayDevice, KeyboardDevice, Platform, PointerDevice, Ps2Input,
    Scheduler,
};
pub use screen::Screen;
pub use tree::{ViewTree, convert_rect};
pub use view::{Bmp, Label, ViewId};
pub use wm::{KeyCommand, WindowManager};
