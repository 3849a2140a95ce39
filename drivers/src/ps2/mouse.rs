use xserv_abi::geometry::Coordinate;
use xserv_abi::input::ButtonMask;
use xserv_lib::klog_trace;

use crate::pointer::{InputLatch, PointerSnapshot};

const PACKET_ALWAYS_ONE: u8 = 0x08;
const PACKET_X_SIGN: u8 = 0x10;
const PACKET_Y_SIGN: u8 = 0x20;
const PACKET_OVERFLOW: u8 = 0xC0;
const PACKET_BUTTONS: u8 = 0x07;

/// Three-byte PS/2 packet decoder with an absolute, display-clamped
/// position.
pub struct Ps2Mouse {
    x: i32,
    y: i32,
    buttons: ButtonMask,
    packet_byte: u8,
    packet: [u8; 3],
    max_x: i32,
    max_y: i32,
}

impl Ps2Mouse {
    pub const fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            buttons: ButtonMask::empty(),
            packet_byte: 0,
            packet: [0; 3],
            max_x: 1,
            max_y: 1,
        }
    }

    /// Ignored unless both extents are positive.
    pub fn set_bounds(&mut self, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            return;
        }
        self.max_x = width;
        self.max_y = height;
        self.x = self.x.clamp(0, width - 1);
        self.y = self.y.clamp(0, height - 1);
    }

    pub fn center(&mut self) {
        self.x = self.max_x / 2;
        self.y = self.max_y / 2;
        self.packet_byte = 0;
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }

    pub fn buttons(&self) -> ButtonMask {
        self.buttons
    }

    /// Feed one byte from the data port. Returns true when it completed a
    /// valid packet, which has then been published and signalled.
    ///
    /// A first byte without bit 3 set is not a packet start and is dropped.
    /// Packets reporting overflow are dropped whole.
    pub fn handle_byte(&mut self, data: u8, sink: &PointerSnapshot, latch: &InputLatch) -> bool {
        let byte_num = self.packet_byte;
        if byte_num == 0 && data & PACKET_ALWAYS_ONE == 0 {
            return false;
        }

        self.packet[byte_num as usize] = data;
        self.packet_byte = (byte_num + 1) % 3;
        if self.packet_byte != 0 {
            return false;
        }

        let [flags, dx_raw, dy_raw] = self.packet;
        if flags & PACKET_OVERFLOW != 0 {
            klog_trace!("ps2 mouse: overflow packet {:#04x} dropped", flags);
            return false;
        }

        self.buttons = ButtonMask::from_bits_truncate(flags & PACKET_BUTTONS);

        let mut dx = dx_raw as i32;
        if flags & PACKET_X_SIGN != 0 {
            dx -= 256;
        }
        let mut dy = dy_raw as i32;
        if flags & PACKET_Y_SIGN != 0 {
            dy -= 256;
        }

        // Device Y grows upward, screen Y grows downward.
        self.x = (self.x + dx).clamp(0, self.max_x - 1);
        self.y = (self.y - dy).clamp(0, self.max_y - 1);

        sink.publish(self.position(), self.buttons);
        latch.signal();
        true
    }
}

impl Default for Ps2Mouse {
    fn default() -> Self {
        Self::new()
    }
}
