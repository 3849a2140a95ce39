//! What the server needs from the system it runs on.
//!
//! Each concern is its own trait so a host can mix real devices with
//! stand-ins; [`Platform`] is implemented for anything that provides all
//! of them.

use xserv_abi::display::DisplayMode;
use xserv_abi::geometry::{Coordinate, Rect};
use xserv_abi::input::ButtonMask;
use xserv_abi::pixel::PixelFormat;
use xserv_drivers::PointerAccel;
use xserv_drivers::ps2::{INPUT_LATCH, KEYBOARD, POINTER};
use xserv_gfx::Layer;

use crate::error::XservResult;
use crate::view::Bmp;

/// Absolute pointer state, already clamped to the display.
pub trait PointerDevice {
    fn position(&mut self) -> Coordinate;
    fn buttons(&mut self) -> ButtonMask;
}

pub trait KeyboardDevice {
    fn has_pending_key(&mut self) -> bool;
    /// `None` when nothing is queued.
    fn read_key(&mut self) -> Option<u8>;
}

pub trait BitmapLoader {
    /// Decode the image at `path` into a bitmap placed at `frame`, in
    /// `format`. Failure is reported as `None` and is never fatal.
    fn load_bitmap(&mut self, frame: Rect, path: &str, format: PixelFormat) -> Option<Bmp>;
}

pub trait DisplayDevice {
    /// Switch to `mode`, returning the mode actually set.
    fn enter_graphics_mode(&mut self, mode: DisplayMode) -> XservResult<DisplayMode>;
    fn enter_text_mode(&mut self);
    /// Push one finished frame to the hardware.
    fn present(&mut self, frame: &Layer);
}

pub trait Scheduler {
    /// Suspend until the pointer produces an event.
    fn yield_until_pointer_event(&mut self);
    fn sleep_ms(&mut self, ms: u64);
}

pub trait Clock {
    /// Monotonic milliseconds.
    fn now_ms(&self) -> u64;
}

pub trait Platform:
    PointerDevice + KeyboardDevice + BitmapLoader + DisplayDevice + Scheduler + Clock
{
}

impl<T> Platform for T where
    T: PointerDevice + KeyboardDevice + BitmapLoader + DisplayDevice + Scheduler + Clock
{
}

/// Pointer and keyboard backed by the PS/2 interrupt handlers in
/// `xserv_drivers::ps2`.
///
/// Positions pass through [`PointerAccel`] once per query, so the frame
/// loop reads the position exactly once per frame.
#[derive(Debug, Default)]
pub struct Ps2Input {
    accel: PointerAccel,
}

impl Ps2Input {
    pub const fn new() -> Self {
        Self {
            accel: PointerAccel::new(),
        }
    }

    /// Consume the "a mouse packet arrived" signal, for hosts whose
    /// scheduler polls instead of blocking.
    pub fn take_pointer_event(&self) -> bool {
        INPUT_LATCH.take()
    }
}

impl PointerDevice for Ps2Input {
    fn position(&mut self) -> Coordinate {
        self.accel.apply(POINTER.position())
    }

    fn buttons(&mut self) -> ButtonMask {
        POINTER.buttons()
    }
}

impl KeyboardDevice for Ps2Input {
    fn has_pending_key(&mut self) -> bool {
        KEYBOARD.has_pending_key()
    }

    fn read_key(&mut self) -> Option<u8> {
        KEYBOARD.read_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ps2_input_reads_driver_state() {
        let mut input = Ps2Input::new();
        POINTER.publish(Coordinate::new(100, 100), ButtonMask::LEFT);
        assert_eq!(input.position(), Coordinate::new(100, 100));
        assert!(input.buttons().left());

        POINTER.publish(Coordinate::new(116, 91), ButtonMask::empty());
        assert_eq!(input.position(), Coordinate::new(104, 97));
        assert!(!input.buttons().left());

        KEYBOARD.push(b'r');
        assert!(input.has_pending_key());
        assert_eq!(input.read_key(), Some(b'r'));
        assert_eq!(input.read_key(), None);
    }

    #[test]
    fn test_pointer_event_is_consumed_once() {
        let input = Ps2Input::new();
        INPUT_LATCH.signal();
        assert!(input.take_pointer_event());
        assert!(!input.take_pointer_event());
    }
}
