//! PS/2 device decoding.
//!
//! Port I/O and controller setup belong to the host kernel; these modules
//! only turn the bytes its IRQ 1 and IRQ 12 handlers read from port 0x60
//! into pointer state and characters.
//!
//! ```text
//!  IRQ 12 byte ──▶ Ps2Mouse ──▶ PointerSnapshot ──▶ frame loop
//!                      └──────▶ InputLatch ──────▶ scheduler wake-up
//!  IRQ 1 byte  ──▶ KeyQueue ──────────────────────▶ frame loop
//! ```

pub mod keyboard;
pub mod mouse;

use xserv_lib::klog_info;

use crate::pointer::{InputLatch, PointerSnapshot};
use mouse::Ps2Mouse;

/// Shared by the mouse IRQ handler and the display server.
pub static POINTER: PointerSnapshot = PointerSnapshot::new();

/// Raised after every complete mouse packet.
pub static INPUT_LATCH: InputLatch = InputLatch::new();

pub static KEYBOARD: keyboard::KeyQueue = keyboard::KeyQueue::new();

static MOUSE: spin::Mutex<Ps2Mouse> = spin::Mutex::new(Ps2Mouse::new());

/// Centre the pointer on a `width` x `height` display and publish it.
pub fn init(width: i32, height: i32) {
    let mut mouse = MOUSE.lock();
    mouse.set_bounds(width, height);
    mouse.center();
    let (position, buttons) = (mouse.position(), mouse.buttons());
    drop(mouse);

    POINTER.publish(position, buttons);
    klog_info!("ps2: pointer at ({}, {})", position.x, position.y);
}

/// IRQ 12 entry point.
pub fn handle_mouse_irq(data: u8) {
    MOUSE.lock().handle_byte(data, &POINTER, &INPUT_LATCH);
}

/// IRQ 1 entry point.
pub fn handle_keyboard_irq(scancode: u8) {
    KEYBOARD.handle_scancode(scancode);
}
