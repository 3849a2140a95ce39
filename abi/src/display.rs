//! Display mode descriptor shared by the mode switch and every layer.

use crate::geometry::Size;
use crate::pixel::PixelFormat;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl DisplayMode {
    /// 1024x768, 24 bits per pixel. The mode the server boots into.
    pub const VESA_1024X768X24: Self = Self {
        width: 1024,
        height: 768,
        format: PixelFormat::Rgb888,
    };

    #[inline]
    pub const fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn bytes_per_pixel(&self) -> u8 {
        self.format.bytes_per_pixel()
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.width as usize * self.bytes_per_pixel() as usize
    }
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::VESA_1024X768X24
    }
}
