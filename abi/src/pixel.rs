//! Pixel format definitions

use crate::draw::{Color32, EncodedPixel};

/// Framebuffer pixel layout.
///
/// Every supported format stores its three colour bytes first, so a
/// compositor can blend bytes `0..3` of each pixel without caring which
/// byte is red and which is blue. Four-byte formats carry one trailing
/// padding or alpha byte.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 32-bit ARGB. Memory layout: [B, G, R, A]
    Argb8888 = 0,
    /// 32-bit XRGB. Memory layout: [B, G, R, X]
    Xrgb8888 = 1,
    /// 24-bit RGB. Memory layout: [B, G, R]
    #[default]
    Rgb888 = 2,
    /// 24-bit BGR. Memory layout: [R, G, B]
    Bgr888 = 3,
}

impl PixelFormat {
    #[inline]
    pub fn from_u32(val: u32) -> Option<Self> {
        match val {
            0 => Some(Self::Argb8888),
            1 => Some(Self::Xrgb8888),
            2 => Some(Self::Rgb888),
            3 => Some(Self::Bgr888),
            _ => None,
        }
    }

    /// Pick the default format for a VESA-style bits-per-pixel value.
    #[inline]
    pub fn from_bpp(bpp: u8) -> Option<Self> {
        match bpp {
            24 => Some(Self::Rgb888),
            32 => Some(Self::Xrgb8888),
            _ => None,
        }
    }

    #[inline]
    pub fn bytes_per_pixel(self) -> u8 {
        match self {
            Self::Argb8888 | Self::Xrgb8888 => 4,
            Self::Rgb888 | Self::Bgr888 => 3,
        }
    }

    /// Number of leading colour bytes in each pixel.
    #[inline]
    pub const fn color_bytes(self) -> usize {
        3
    }

    /// Encode a `Color32` (0xAARRGGBB) into the native pixel format.
    #[inline]
    pub fn encode(self, color: Color32) -> EncodedPixel {
        let v = color.0;
        let a = (v >> 24) & 0xFF;
        let r = (v >> 16) & 0xFF;
        let g = (v >> 8) & 0xFF;
        let b = v & 0xFF;

        EncodedPixel(match self {
            Self::Argb8888 => (a << 24) | (r << 16) | (g << 8) | b,
            Self::Xrgb8888 => (0xFF << 24) | (r << 16) | (g << 8) | b,
            Self::Rgb888 => (r << 16) | (g << 8) | b,
            Self::Bgr888 => (b << 16) | (g << 8) | r,
        })
    }

    /// Inverse of [`encode`](Self::encode) for the bytes of one pixel.
    #[inline]
    pub fn decode(self, bytes: &[u8]) -> Color32 {
        let (r, g, b) = match self {
            Self::Argb8888 | Self::Xrgb8888 | Self::Rgb888 => (bytes[2], bytes[1], bytes[0]),
            Self::Bgr888 => (bytes[0], bytes[1], bytes[2]),
        };
        Color32::rgb(r, g, b)
    }
}
