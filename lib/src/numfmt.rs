//! Stack-only number formatting.
//!
//! Used on per-frame paths (the FPS readout) where building a heap `String`
//! every frame would churn the allocator. Each function writes into a
//! caller-provided buffer and returns the formatted part as `&str`.
//!
//! ```ignore
//! let mut buf = NumBuf::<24>::new();
//! let text = buf.format_with_suffix(60, " FPS"); // "60 FPS"
//! ```

/// Format a `u64` as decimal into `buf`.
///
/// Returns `"0"` if the buffer cannot hold every digit (or is empty).
pub fn fmt_u64(value: u64, buf: &mut [u8]) -> &str {
    if buf.is_empty() {
        return "";
    }

    // Digits are produced in reverse at the end of the buffer, then shifted.
    let mut pos = buf.len();
    let mut n = value;
    loop {
        if pos == 0 {
            buf[0] = b'0';
            return ascii(&buf[..1]);
        }
        pos -= 1;
        buf[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }

    let len = buf.len() - pos;
    buf.copy_within(pos.., 0);
    ascii(&buf[..len])
}

#[inline]
pub fn fmt_u32(value: u32, buf: &mut [u8]) -> &str {
    fmt_u64(value as u64, buf)
}

#[inline]
fn ascii(bytes: &[u8]) -> &str {
    // Only ASCII digits and caller-supplied `&str` suffixes are ever written.
    core::str::from_utf8(bytes).unwrap_or("")
}

/// Stack formatting buffer.
///
/// `u64::MAX` needs 20 bytes; a suffix needs its own length on top.
pub struct NumBuf<const N: usize> {
    buf: [u8; N],
}

impl<const N: usize> NumBuf<N> {
    #[inline]
    pub const fn new() -> Self {
        Self { buf: [0u8; N] }
    }

    #[inline]
    pub fn format_u64(&mut self, value: u64) -> &str {
        fmt_u64(value, &mut self.buf)
    }

    #[inline]
    pub fn format_u32(&mut self, value: u32) -> &str {
        fmt_u32(value, &mut self.buf)
    }

    /// Decimal `value` followed by `suffix`. The suffix is truncated at a
    /// character boundary if it does not fit.
    pub fn format_with_suffix(&mut self, value: u64, suffix: &str) -> &str {
        let digits = fmt_u64(value, &mut self.buf).len();
        let room = N - digits;
        let mut take = suffix.len().min(room);
        while !suffix.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[digits..digits + take].copy_from_slice(&suffix.as_bytes()[..take]);
        ascii(&self.buf[..digits + take])
    }
}

impl<const N: usize> Default for NumBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}
