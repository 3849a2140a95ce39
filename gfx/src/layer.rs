use alloc::vec;
use alloc::vec::Vec;

use xserv_abi::draw::{Canvas, Color32, EncodedPixel};
use xserv_abi::geometry::Size;
use xserv_abi::pixel::PixelFormat;

/// An owned, row-major pixel buffer plus the coefficient it is blended with
/// when composited onto another layer.
///
/// The buffer is always exactly `width * height * bytes_per_pixel` bytes
/// with no row padding. A layer never changes size; owners that need a
/// different size build a new one and drop the old.
#[derive(Clone)]
pub struct Layer {
    size: Size,
    format: PixelFormat,
    alpha: f32,
    raw: Vec<u8>,
}

impl Layer {
    /// Allocate a zero-filled, fully opaque layer. Negative extents are
    /// treated as empty.
    pub fn new(size: Size, format: PixelFormat) -> Self {
        let size = Size::new(size.width.max(0), size.height.max(0));
        let len = size.area() * format.bytes_per_pixel() as usize;
        Self {
            size,
            format,
            alpha: 1.0,
            raw: vec![0u8; len],
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Set the blend coefficient, clamped to `[0.0, 1.0]`.
    #[inline]
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn bpp(&self) -> usize {
        self.format.bytes_per_pixel() as usize
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.size.width as usize * self.bpp()
    }

    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    #[inline]
    pub fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.raw
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Decoded colour at `(x, y)`, or `None` outside the buffer.
    pub fn pixel_at(&self, x: i32, y: i32) -> Option<Color32> {
        if x < 0 || y < 0 || x >= self.size.width || y >= self.size.height {
            return None;
        }
        let off = y as usize * self.pitch() + x as usize * self.bpp();
        Some(self.format.decode(&self.raw[off..off + self.bpp()]))
    }

    pub fn fill(&mut self, color: Color32) {
        let px = self.format.encode(color);
        self.clear(px);
    }
}

impl Canvas for Layer {
    #[inline]
    fn size(&self) -> Size {
        self.size
    }

    #[inline]
    fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    fn pitch_bytes(&self) -> usize {
        self.pitch()
    }

    #[inline]
    fn write_encoded_at(&mut self, byte_offset: usize, pixel: EncodedPixel) {
        let bpp = self.bpp();
        let bytes = pixel.to_u32().to_le_bytes();
        if let Some(dst) = self.raw.get_mut(byte_offset..byte_offset + bpp) {
            dst.copy_from_slice(&bytes[..bpp]);
        }
    }
}

impl core::fmt::Debug for Layer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Layer")
            .field("size", &self.size)
            .field("format", &self.format)
            .field("alpha", &self.alpha)
            .finish()
    }
}
