use crate::geometry::{Rect, Size};
use crate::pixel::PixelFormat;

/// An opaque 0xAARRGGBB colour. Translucency belongs to layers, never to
/// individual colours.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Color32(pub u32);

impl Color32 {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const GRAY: Self = Self::rgb(127, 127, 127);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const PURPLE: Self = Self::rgb(159, 0, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([a, r, g, b]))
    }

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    #[inline]
    pub const fn red(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    #[inline]
    pub const fn green(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        self.0.to_be_bytes()[3]
    }
}

/// A colour laid out for one [`PixelFormat`]; its little-endian bytes are
/// what lands in pixel memory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct EncodedPixel(pub u32);

impl EncodedPixel {
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

/// A pixel surface. Implementors store bytes; everything that clips lives
/// in the provided methods, so writes past the edge are dropped, not
/// wrapped.
pub trait Canvas {
    fn size(&self) -> Size;

    fn pixel_format(&self) -> PixelFormat;

    /// Store one pixel at `byte_offset`, which the provided methods keep
    /// in bounds.
    fn write_encoded_at(&mut self, byte_offset: usize, pixel: EncodedPixel);

    #[inline]
    fn pitch_bytes(&self) -> usize {
        self.size().width.max(0) as usize * self.pixel_format().bytes_per_pixel() as usize
    }

    #[inline]
    fn put_pixel(&mut self, x: i32, y: i32, pixel: EncodedPixel) {
        let size = self.size();
        if x < 0 || y < 0 || x >= size.width || y >= size.height {
            return;
        }
        let bpp = self.pixel_format().bytes_per_pixel() as usize;
        let offset = y as usize * self.pitch_bytes() + x as usize * bpp;
        self.write_encoded_at(offset, pixel);
    }

    /// Columns `x0..=x1` of `row`, clipped.
    fn fill_span(&mut self, row: i32, x0: i32, x1: i32, pixel: EncodedPixel) {
        let size = self.size();
        if row < 0 || row >= size.height {
            return;
        }
        let (x0, x1) = (x0.max(0), x1.min(size.width - 1));
        if x0 > x1 {
            return;
        }
        let bpp = self.pixel_format().bytes_per_pixel() as usize;
        let start = row as usize * self.pitch_bytes();
        for x in x0 as usize..=x1 as usize {
            self.write_encoded_at(start + x * bpp, pixel);
        }
    }

    fn fill_rect_encoded(&mut self, rect: Rect, pixel: EncodedPixel) {
        if rect.is_empty() {
            return;
        }
        let top = rect.min_y().max(0);
        let bottom = (rect.max_y() - 1).min(self.size().height - 1);
        for row in top..=bottom {
            self.fill_span(row, rect.min_x(), rect.max_x() - 1, pixel);
        }
    }

    #[inline]
    fn clear(&mut self, pixel: EncodedPixel) {
        self.fill_rect_encoded(Rect::with_size(self.size()), pixel);
    }
}
