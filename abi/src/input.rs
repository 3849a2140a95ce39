//! Pointer button state as published by the pointer driver.

use bitflags::bitflags;

bitflags! {
    /// The 3-bit button set reported with every pointer packet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ButtonMask: u8 {
        const LEFT = 0x01;
        const RIGHT = 0x02;
        const MIDDLE = 0x04;
    }
}

impl ButtonMask {
    #[inline]
    pub fn left(self) -> bool {
        self.contains(Self::LEFT)
    }
}
